use crate::error::{OverlayError, Result};
use crate::rpc::BackendClient;
use crate::settings::{OverlaySettings, SettingsPatch};

/// Named style presets stored by the backend.
#[derive(Clone)]
pub struct PresetClient {
    backend: BackendClient,
}

impl PresetClient {
    pub fn new(backend: BackendClient) -> Self {
        PresetClient { backend }
    }

    pub async fn list(&self) -> Result<Vec<String>> {
        self.backend.get_presets().await
    }

    /// Save `patch` under `name`. Blank names are rejected locally.
    pub async fn save(&self, name: &str, patch: &SettingsPatch) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(OverlayError::InvalidParameters(
                "preset name must not be blank".to_string(),
            ));
        }
        self.backend.save_preset(name, patch).await?;
        log::info!("[presets] saved '{}'", name);
        Ok(())
    }

    /// Save the style-related part of `settings`.
    pub async fn save_current(&self, name: &str, settings: &OverlaySettings) -> Result<()> {
        self.save(name, &settings.preset_patch()).await
    }

    /// Fetch a preset. The caller applies it through the pipeline's settings update.
    pub async fn load(&self, name: &str) -> Result<SettingsPatch> {
        let patch = self.backend.load_preset(name).await?;
        log::info!("[presets] loaded '{}'", name);
        Ok(patch)
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        self.backend.delete_preset(name).await?;
        log::info!("[presets] deleted '{}'", name);
        Ok(())
    }
}
