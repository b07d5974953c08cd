//! The boundary to the host application's scripting API.

use std::path::Path;

use crate::action::UserParameter;
use crate::addin::HostError;

/// Operations the add-in needs from Fusion.
///
/// A host integration implements this against the live application. The
/// add-in holds the implementation behind a lock, so only one call is ever
/// in flight and methods may freely mutate host state.
pub trait FusionHost: Send + 'static {
    /// Runs `code` in the host's script environment and returns everything
    /// it printed.
    ///
    /// The environment exposes the host modules plus `app`, `design` and
    /// `root_comp` for the active document.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Script`] if the script raises.
    fn execute_script(&mut self, code: &str) -> Result<String, HostError>;

    /// Saves the active viewport to `path` at its on-screen size.
    ///
    /// Returns `Ok(false)` if the host declined to write the file.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NoActiveViewport`] if nothing can be captured.
    fn save_viewport_image(&mut self, path: &Path) -> Result<bool, HostError>;

    /// Returns the user parameters of the active design.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no active design.
    fn user_parameters(&mut self) -> Result<Vec<UserParameter>, HostError>;

    /// Sets the expression of a user or model parameter and returns it as it
    /// reads after the change.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::ParameterNotFound`] for unknown names and
    /// [`HostError::Rejected`] for expressions the host cannot evaluate.
    fn set_parameter_expression(
        &mut self,
        name: &str,
        expression: &str,
    ) -> Result<UserParameter, HostError>;
}
