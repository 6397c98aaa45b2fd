//! Usage: Page-surface collaborator trait (visible URL, error slot, login affordance, navigation).

pub const HOME_LOCATION: &str = "/";
pub const LOGIN_LOCATION: &str = "/login.html";

/// The parts of the page the coordinator touches. Markup, styling, and the
/// rest of the page are owned by the embedding application.
pub trait PageSurface: Send {
    /// Raw query string of the current location, without the leading `?`.
    fn query_string(&self) -> String;

    /// Replace the visible URL with the bare path, dropping every query
    /// parameter. Must take effect synchronously; the coordinator calls this
    /// before any asynchronous work so the authorization code never lingers
    /// in the location bar or history.
    fn strip_transient_query(&mut self);

    /// Show a message in the single error slot near the active form.
    fn show_error(&mut self, message: &str);

    /// Re-enable the federated-login controls after an attempt ends.
    fn reset_login_affordance(&mut self);

    /// Send the user agent to the given location.
    fn navigate(&mut self, location: &str);
}
