//! Device selection for the run pipeline.
//!
//! Listing and choosing are separate stages. `ChooseDeviceStage` is the
//! two-state selector: the context has no `device` until a prompt over a
//! non-empty candidate list succeeds.

use super::{names, Stage};
use crate::adapters::{DeviceChooser, DeviceLister};
use crate::context::BuildContext;
use crate::errors::NativeflowError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Records the available devices in the context.
pub struct ListDevicesStage {
    lister: Arc<dyn DeviceLister>,
}

impl std::fmt::Debug for ListDevicesStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListDevicesStage").finish_non_exhaustive()
    }
}

impl ListDevicesStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(lister: Arc<dyn DeviceLister>) -> Self {
        Self { lister }
    }
}

#[async_trait]
impl Stage for ListDevicesStage {
    fn name(&self) -> &str {
        names::LIST_DEVICES
    }

    async fn execute(&self, ctx: BuildContext) -> Result<BuildContext, NativeflowError> {
        let devices = self.lister.list().await?;
        info!(count = devices.len(), "Found devices");
        Ok(ctx.with_devices(devices)?)
    }
}

/// Prompts for one of the listed devices.
pub struct ChooseDeviceStage {
    chooser: Arc<dyn DeviceChooser>,
}

impl std::fmt::Debug for ChooseDeviceStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChooseDeviceStage").finish_non_exhaustive()
    }
}

impl ChooseDeviceStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(chooser: Arc<dyn DeviceChooser>) -> Self {
        Self { chooser }
    }
}

#[async_trait]
impl Stage for ChooseDeviceStage {
    fn name(&self) -> &str {
        names::CHOOSE_DEVICE
    }

    async fn execute(&self, ctx: BuildContext) -> Result<BuildContext, NativeflowError> {
        let devices = match ctx.devices() {
            Some(devices) if !devices.is_empty() => devices,
            _ => return Err(NativeflowError::NoDevices),
        };

        let index = self.chooser.choose(devices).await?;
        let device = devices.get(index).cloned().ok_or_else(|| {
            NativeflowError::Prompt(format!(
                "choice {index} is out of range for {} devices",
                devices.len()
            ))
        })?;

        info!(device = %device.label(), "Device chosen");
        Ok(ctx.with_device(device)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::devices::{MockDeviceChooser, MockDeviceLister};
    use crate::context::Device;
    use pretty_assertions::assert_eq;

    fn candidates() -> Vec<Device> {
        vec![
            Device::new("Ann's iPhone", "17.2", "00008110-001A2B3C4D5E6F70", false),
            Device::new("iPad Air", "16.4", "00008103-000A1B2C3D4E5F60", false),
            Device::new("iPhone 15", "17.2", "5B6C1D2E-3F40-4152-6374-8596A7B8C9D0", true),
        ]
    }

    #[tokio::test]
    async fn test_list_records_devices() {
        let mut lister = MockDeviceLister::new();
        lister.expect_list().returning(|| Ok(candidates()));

        let ctx = ListDevicesStage::new(Arc::new(lister))
            .execute(BuildContext::new("/app"))
            .await
            .unwrap();
        assert_eq!(ctx.devices().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_list_never_prompts() {
        let mut chooser = MockDeviceChooser::new();
        chooser.expect_choose().times(0);
        let stage = ChooseDeviceStage::new(Arc::new(chooser));

        let empty = BuildContext::new("/app").with_devices(Vec::new()).unwrap();
        let err = stage.execute(empty).await.unwrap_err();
        assert_eq!(err.to_string(), "No ios devices found.");

        let absent = stage.execute(BuildContext::new("/app")).await.unwrap_err();
        assert!(matches!(absent, NativeflowError::NoDevices));
    }

    #[tokio::test]
    async fn test_nth_choice_is_recorded() {
        for n in 0..candidates().len() {
            let mut chooser = MockDeviceChooser::new();
            chooser
                .expect_choose()
                .withf(|devices| devices.len() == 3)
                .times(1)
                .returning(move |_| Ok(n));

            let ctx = BuildContext::new("/app").with_devices(candidates()).unwrap();
            let ctx = ChooseDeviceStage::new(Arc::new(chooser)).execute(ctx).await.unwrap();
            assert_eq!(ctx.device(), Some(&candidates()[n]));
        }
    }

    #[tokio::test]
    async fn test_out_of_range_choice() {
        let mut chooser = MockDeviceChooser::new();
        chooser.expect_choose().returning(|_| Ok(7));

        let ctx = BuildContext::new("/app").with_devices(candidates()).unwrap();
        let err = ChooseDeviceStage::new(Arc::new(chooser)).execute(ctx).await.unwrap_err();
        assert!(matches!(err, NativeflowError::Prompt(_)));
    }

    #[tokio::test]
    async fn test_prompt_failure_propagates() {
        let mut chooser = MockDeviceChooser::new();
        chooser
            .expect_choose()
            .returning(|_| Err(NativeflowError::Prompt("interrupted".into())));

        let ctx = BuildContext::new("/app").with_devices(candidates()).unwrap();
        assert!(ChooseDeviceStage::new(Arc::new(chooser)).execute(ctx).await.is_err());
    }
}
