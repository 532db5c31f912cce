/// Compile-time build metadata produced by `build.rs`.
#[derive(Debug, Clone, Copy)]
pub struct BuildMetadata {
    pub version: &'static str,
    pub commit: &'static str,
    pub tree: &'static str,
    pub timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
    pub rustc: &'static str,
}

impl BuildMetadata {
    /// One-line summary printed by `turbocash_cli version`.
    pub fn summary(&self) -> String {
        format!(
            "turbocash {} ({} {}, {} {}, built {})",
            self.version, self.commit, self.tree, self.target, self.profile, self.timestamp
        )
    }
}

/// Returns the statically-embedded build metadata.
pub fn current() -> BuildMetadata {
    BuildMetadata {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("TURBOCASH_BUILD_COMMIT").unwrap_or("unknown"),
        tree: option_env!("TURBOCASH_BUILD_TREE").unwrap_or("unknown"),
        timestamp: option_env!("TURBOCASH_BUILD_TIMESTAMP").unwrap_or("unknown"),
        target: option_env!("TURBOCASH_BUILD_TARGET").unwrap_or("unknown"),
        profile: option_env!("TURBOCASH_BUILD_PROFILE").unwrap_or("unknown"),
        rustc: option_env!("TURBOCASH_BUILD_RUSTC").unwrap_or("unknown"),
    }
}
