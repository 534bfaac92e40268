//! The single degrade-to-empty site.
//!
//! Every retrieval source call goes through [`shielded`]: a failure is
//! logged and converted into the type's empty value, so one flaky backend
//! can never abort a fusion. The policy lives here and nowhere else.

use tracing::warn;

use aegis_core::errors::AegisResult;

/// Run a source call, converting any error into `T::default()`.
pub fn shielded<T: Default>(source: &str, call: impl FnOnce() -> AegisResult<T>) -> T {
    match call() {
        Ok(value) => value,
        Err(e) => {
            warn!(source, error = %e, "retrieval source failed, degrading to empty");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_core::errors::StoreError;

    #[test]
    fn failure_becomes_empty_vec() {
        let out: Vec<u32> = shielded("test-source", || {
            Err(StoreError::Sqlite {
                message: "locked".to_string(),
            }
            .into())
        });
        assert!(out.is_empty());
    }

    #[test]
    fn success_passes_through() {
        let out: Vec<u32> = shielded("test-source", || Ok(vec![1, 2]));
        assert_eq!(out, vec![1, 2]);
    }
}
