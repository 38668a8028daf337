use std::fmt;

use crate::backend::Backend;

/// Snapshot of the host platform and the dispatcher configuration.
/// Purely informational; nothing on the solve path reads it.
#[derive(Debug, Clone)]
pub struct DispatcherInfo {
    /// Host operating system
    pub system: &'static str,
    /// Pointer width in bits
    pub word_size: usize,
    /// Compiler family
    pub compiler: &'static str,
    /// Detected core count
    pub cores: usize,
    /// Configured worker count
    pub threads: usize,
    /// Configured memory budget in MB
    pub memory_mb: usize,
    /// Workspaces built with the small table budget
    pub workspaces_small: usize,
    /// Workspaces built with the large table budget
    pub workspaces_large: usize,
    /// Backends compiled into this build
    pub compiled: Vec<Backend>,
    /// Backend subsequent runs will use
    pub active: Backend,
}

impl DispatcherInfo {
    pub(crate) fn probe(
        threads: usize,
        memory_mb: usize,
        workspaces_small: usize,
        workspaces_large: usize,
        active: Backend,
    ) -> Self {
        DispatcherInfo {
            system: host_os(),
            word_size: usize::BITS as usize,
            compiler: "rustc",
            cores: detected_cores(),
            threads,
            memory_mb,
            workspaces_small,
            workspaces_large,
            compiled: Backend::compiled(),
            active,
        }
    }
}

fn host_os() -> &'static str {
    if cfg!(target_os = "windows") {
        "Windows"
    } else if cfg!(target_os = "macos") {
        "Apple"
    } else if cfg!(target_os = "linux") {
        "Linux"
    } else {
        "unknown"
    }
}

fn detected_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl fmt::Display for DispatcherInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "ddbatch dispatcher")?;
        writeln!(f, "------------------")?;
        writeln!(f, "{:<18}{:>15}", "System", self.system)?;
        writeln!(f, "{:<18}{:>13} bits", "Word size", self.word_size)?;
        writeln!(f, "{:<18}{:>15}", "Compiler", self.compiler)?;
        writeln!(f, "{:<18}{:>15}", "Cores", self.cores)?;
        writeln!(f, "{:<18}{:>15}", "Threads", self.threads)?;
        writeln!(f, "{:<18}{:>15}", "Memory max (MB)", self.memory_mb)?;
        let split = format!("{} S, {} L", self.workspaces_small, self.workspaces_large);
        writeln!(f, "{:<18}{:>15}", "Workspaces", split)?;
        let labels: Vec<&str> = self.compiled.iter().map(Backend::label).collect();
        writeln!(f, "{:<18}{:>15}", "Backends", labels.join(" "))?;
        writeln!(f, "{:<18}{:>15}", "Active", self.active.label())
    }
}
