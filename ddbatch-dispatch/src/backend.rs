/// The concurrency strategies a dispatcher can drive the worker loop
/// with.
///
/// Codes are stable across builds; whether a backend is *compiled in*
/// depends on the crate features (`Pool` and `ParIter` need the default
/// `parallel` feature). Every backend produces identical batch results;
/// the choice affects only latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Backend {
    /// One worker, inline on the calling thread. The fallback and the
    /// reference implementation for the others.
    Basic = 0,
    /// One native OS thread per configured worker, joined before return
    Thread = 1,
    /// Native threads for all workers but the first, which runs inline
    /// on the calling thread
    Hybrid = 2,
    /// A dedicated thread pool sized to the worker count
    Pool = 3,
    /// Data-parallel iteration over worker ids on the shared pool
    ParIter = 4,
}

impl Backend {
    /// Every backend this crate knows about, code order
    pub const ALL: [Backend; 5] = [
        Backend::Basic,
        Backend::Thread,
        Backend::Hybrid,
        Backend::Pool,
        Backend::ParIter,
    ];

    /// Look up a backend by its registry code
    pub fn from_code(code: u32) -> Option<Backend> {
        Backend::ALL.into_iter().find(|b| *b as u32 == code)
    }

    /// Registry code for this backend
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// True when this build can actually run the backend
    pub fn compiled_in(&self) -> bool {
        match self {
            Backend::Basic | Backend::Thread | Backend::Hybrid => true,
            Backend::Pool | Backend::ParIter => cfg!(feature = "parallel"),
        }
    }

    /// The backends compiled into this build, code order
    pub fn compiled() -> Vec<Backend> {
        Backend::ALL
            .into_iter()
            .filter(Backend::compiled_in)
            .collect()
    }

    /// Default selection: the pool when available, otherwise native
    /// threads
    pub fn default_backend() -> Backend {
        if Backend::Pool.compiled_in() {
            Backend::Pool
        } else {
            Backend::Thread
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Backend::Basic => "basic",
            Backend::Thread => "thread",
            Backend::Hybrid => "hybrid",
            Backend::Pool => "pool",
            Backend::ParIter => "par-iter",
        }
    }

    /// Parse a label as printed by `label()`
    pub fn from_label(s: &str) -> Option<Backend> {
        Backend::ALL.into_iter().find(|b| b.label() == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for backend in Backend::ALL {
            assert_eq!(Backend::from_code(backend.code()), Some(backend));
        }
        assert_eq!(Backend::from_code(5), None);
        assert_eq!(Backend::from_code(99), None);
    }

    #[test]
    fn test_label_round_trip() {
        for backend in Backend::ALL {
            assert_eq!(Backend::from_label(backend.label()), Some(backend));
        }
        assert_eq!(Backend::from_label("openmp"), None);
    }

    #[test]
    fn test_basic_always_compiled() {
        assert!(Backend::Basic.compiled_in());
        assert!(Backend::Thread.compiled_in());
        assert!(Backend::compiled().contains(&Backend::default_backend()));
    }
}
