const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

macro_rules! env_or {
    ($key:literal, $default:literal) => {
        option_env!($key).unwrap_or($default)
    };
}

/// Build metadata baked in by `build.rs`.
pub struct BuildInfo {
    pub version: &'static str,
    pub commit_short: &'static str,
    pub build_time: &'static str,
    pub profile: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit_short: env_or!("GIT_COMMIT_SHORT", "unknown"),
            build_time: env_or!("BUILD_TIME", "unknown"),
            profile: if cfg!(debug_assertions) {
                "debug"
            } else {
                "release"
            },
        }
    }
}

impl BuildInfo {
    /// One-line form used by `--version`.
    pub fn version_line(&self) -> String {
        format!(
            "mediareader {} ({}, {})",
            self.version, self.commit_short, self.profile
        )
    }
}

pub fn print_version(info: &BuildInfo) {
    println!("{BOLD}mediareader{RESET} {CYAN}{}{RESET}", info.version);
    print_row("Commit", info.commit_short);
    print_row("Build time", info.build_time);
    println!("  {BOLD}{:<12}{RESET}{YELLOW}{}{RESET}", "Profile", info.profile);
}

fn print_row(label: &str, value: &str) {
    println!("  {BOLD}{label:<12}{RESET}{value}");
}
