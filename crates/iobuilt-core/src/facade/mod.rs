// ── Anti-corruption facades ──
//
// Read-only views one bounded context exposes to another, so stores never
// reach into each other's state.

mod iam;
mod projects;

pub use iam::{ActingUser, IamFacade};
pub use projects::ProjectsFacade;
