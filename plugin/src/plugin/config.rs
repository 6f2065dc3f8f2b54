use im_switch_core::{Config, ConfigOverrides, PlatformOverrides};
use nvim_oxi::{
    self as oxi,
    conversion::FromObject,
    lua,
};
use serde::Deserialize;

/// Options table accepted by `setup()`. Every key is optional, command
/// strings fall back to the per-platform defaults one by one.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PluginConfig {
    /// Key toggling the plugin in normal and insert mode
    #[serde(default)]
    pub on_key: Option<String>,

    #[serde(default, rename = "async")]
    pub asynchronous: Option<bool>,

    #[serde(default)]
    pub status: Option<bool>,

    #[serde(default)]
    pub macos: Option<PlatformOverrides>,

    #[serde(default)]
    pub windows: Option<PlatformOverrides>,

    #[serde(default)]
    pub linux: Option<PlatformOverrides>,
}

impl PluginConfig {
    pub fn commands(&self) -> Config {
        Config::default().with_overrides(ConfigOverrides {
            macos: self.macos.clone(),
            windows: self.windows.clone(),
            linux: self.linux.clone(),
            asynchronous: self.asynchronous,
            status: self.status,
        })
    }
}

impl FromObject for PluginConfig {
    fn from_object(obj: oxi::Object) -> Result<Self, oxi::conversion::Error> {
        Self::deserialize(oxi::serde::Deserializer::new(obj)).map_err(Into::into)
    }
}

impl lua::Poppable for PluginConfig {
    unsafe fn pop(lstate: *mut lua::ffi::lua_State) -> Result<Self, lua::Error> {
        let obj = oxi::Object::pop(lstate)?;
        Self::from_object(obj).map_err(lua::Error::pop_error_from_err::<Self, _>)
    }
}
