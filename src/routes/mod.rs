/// Router Module Index
///
/// Splits the routing table by access level. Authentication itself is enforced by the
/// `AuthUser` extractor on every authenticated handler, including the method fallbacks,
/// so an anonymous caller always sees 401 before 405.

/// Routes reachable without a session: health, signup, signin and the anti-forgery primer.
pub mod public;

/// Routes whose handlers all require a live session.
pub mod authenticated;
