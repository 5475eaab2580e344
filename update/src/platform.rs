//! Host platform detection

/// Decides whether the host can run the resource at all
pub trait Platform {
    fn is_supported(&self) -> bool;

    /// Human readable platform name for logs
    fn name(&self) -> &str;
}

/// The platform this binary was built for; only macOS is supported
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPlatform;

impl Platform for HostPlatform {
    fn is_supported(&self) -> bool {
        cfg!(target_os = "macos")
    }

    fn name(&self) -> &str {
        std::env::consts::OS
    }
}

/// A platform with a fixed answer, for hosts that detect the OS themselves
#[derive(Debug, Clone, Copy)]
pub struct StaticPlatform {
    pub supported: bool,
}

impl StaticPlatform {
    pub fn supported() -> Self {
        Self { supported: true }
    }

    pub fn unsupported() -> Self {
        Self { supported: false }
    }
}

impl Platform for StaticPlatform {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn name(&self) -> &str {
        if self.supported {
            "supported"
        } else {
            "unsupported"
        }
    }
}
