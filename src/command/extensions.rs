//! Extension commands shipped with the socket binary

use super::{CommandRegistry, RegistryError};
use anyhow::{bail, Result};
use joycontrol_shared::{defaults, Button, DeviceState};
use std::sync::Arc;
use tracing::info;

/// Register the default host commands
pub fn register_defaults(
    registry: &mut CommandRegistry,
    device: Arc<dyn DeviceState>,
) -> Result<(), RegistryError> {
    registry.register("click", move |args: Vec<String>| {
        let device = device.clone();
        async move { click(device.as_ref(), &args).await }
    })
}

/// Press the given buttons, push, wait, release, push
async fn click(device: &dyn DeviceState, args: &[String]) -> Result<Option<String>> {
    if args.is_empty() {
        bail!("\"click\" command requires a button!");
    }

    let mut buttons = Vec::with_capacity(args.len());
    for arg in args {
        let button: Button = arg.parse()?;
        if !device.available_buttons().contains(&button) {
            bail!("Button {} does not exist on {}", button, device.controller());
        }
        buttons.push(button);
    }

    info!("Clicking {}", args.join(" "));
    device.connect().await?;

    device.set_buttons(&buttons, true);
    device.send().await?;
    tokio::time::sleep(defaults::CLICK_DURATION).await;
    device.set_buttons(&buttons, false);
    device.send().await?;

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use joycontrol_shared::{Controller, ControllerState};

    #[tokio::test]
    async fn test_click_presses_and_releases() {
        let (state, mut link) = ControllerState::new(Controller::JoyconR);
        let state = Arc::new(state);
        let mut registry = CommandRegistry::new();
        register_defaults(&mut registry, state.clone()).unwrap();

        let click = registry.lookup("click").expect("click registered");
        click.call(vec!["a".into(), "home".into()]).await.unwrap();

        assert!(!state.is_pressed(Button::A));
        assert_eq!(state.reports_sent(), 2);
        // Last report pushed is the release
        assert!(link.borrow_and_update().buttons.is_empty());
    }

    #[tokio::test]
    async fn test_click_validates_buttons() {
        let (state, _link) = ControllerState::new(Controller::JoyconL);
        let state = Arc::new(state);

        assert!(click(state.as_ref(), &[]).await.is_err());
        assert!(click(state.as_ref(), &["a".to_string()]).await.is_err());
        assert!(click(state.as_ref(), &["jump".to_string()]).await.is_err());
        assert_eq!(state.reports_sent(), 0);
    }

    #[test]
    fn test_register_twice_fails() {
        let (state, _link) = ControllerState::new(Controller::ProController);
        let state: Arc<dyn DeviceState> = Arc::new(state);
        let mut registry = CommandRegistry::new();

        register_defaults(&mut registry, state.clone()).unwrap();
        assert_eq!(
            register_defaults(&mut registry, state),
            Err(RegistryError::DuplicateCommand("click".into()))
        );
    }
}
