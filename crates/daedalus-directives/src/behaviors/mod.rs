//! Built-in behavior modules.
//!
//! | Directive | Module | Scope | Concern |
//! |-----------|--------|-------|---------|
//! | `@upper` | [`upper`] | field | Upper-case string results |
//! | `@length(min, max)` | [`length`] | field | Reject strings outside bounds |
//! | `@date(format)` | [`date`] | field | Render results as formatted dates |
//! | `@fetch(url)` | [`fetch`] | field | Inject a remote JSON payload into the arguments |
//! | `@auth(role)` | [`auth`] | field | Require a caller role, short-circuiting otherwise |
//! | `@uniqueId(field)` | [`unique_id`] | type | Replace a field with an identifier generator |
//! | `@inject(name, value)` | [`inject`] | field | Set `args.input[name]` before resolving |

pub mod auth;
pub mod date;
pub mod fetch;
pub mod inject;
pub mod length;
pub mod unique_id;
pub mod upper;

pub use auth::AuthBehavior;
pub use date::{DateBehavior, DateSettings, MissingValuePolicy};
pub use fetch::FetchBehavior;
pub use inject::InjectBehavior;
pub use length::LengthBehavior;
pub use unique_id::UniqueIdResolver;
pub use upper::UpperBehavior;

use daedalus_core::ResolveResult;
use daedalus_telemetry::{record_directive, Outcome};

/// Records the outcome of one wrapper invocation and passes the result through.
pub(crate) fn observed(directive: &str, result: ResolveResult) -> ResolveResult {
    let outcome = if result.is_ok() {
        Outcome::Success
    } else {
        Outcome::Failure
    };
    record_directive(directive, outcome);
    result
}
