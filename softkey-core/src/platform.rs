use crate::config::Mode;

/// What the host is running on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Platform {
    pub ios: bool,
    pub android: bool,
    /// Phone or tablet form factor.
    pub mobile: bool,
    /// Mobile, but in a plain browser rather than a native shell.
    pub mobileweb: bool,
    /// Running inside a native shell (Capacitor/Cordova style).
    pub hybrid: bool,
    /// The browser exposes the Close Watcher API.
    pub close_watcher: bool,
}

impl Platform {
    /// Derive platform flags from a user agent string.
    pub fn from_user_agent(ua: &str, hybrid: bool) -> Self {
        let ua = ua.to_ascii_lowercase();
        let ipad = ua.contains("ipad");
        let ios = ua.contains("iphone") || ipad || ua.contains("ipod");
        let android = ua.contains("android");
        let mobile = ios || android || ua.contains("mobi");
        Self {
            ios,
            android,
            mobile,
            mobileweb: mobile && !hybrid,
            hybrid,
            close_watcher: false,
        }
    }

    pub fn with_close_watcher(mut self, supported: bool) -> Self {
        self.close_watcher = supported;
        self
    }

    pub fn default_mode(&self) -> Mode {
        if self.ios { Mode::Ios } else { Mode::Md }
    }

    /// iOS always needs the input shims. Android only does in a mobile
    /// browser, where the viewport no longer resizes for the keyboard.
    pub fn needs_input_shims(&self) -> bool {
        (self.ios && self.mobile) || (self.android && self.mobileweb)
    }
}
