//! Fallible allocation of search buffers.
use crate::searcher::SearchError;

/// A vector of `len` copies of `value`, reporting allocation failure as an error.
pub fn filled_vec<T: Clone>(
    len: usize,
    value: T,
    what: &'static str,
) -> Result<Vec<T>, SearchError> {
    let mut vec = Vec::new();
    reserve_exact(&mut vec, len, what)?;
    vec.resize(len, value);
    Ok(vec)
}

/// Make sure `vec` can hold `len` elements without reallocating.
pub fn reserve_exact<T>(
    vec: &mut Vec<T>,
    len: usize,
    what: &'static str,
) -> Result<(), SearchError> {
    let additional = len.saturating_sub(vec.len());
    vec.try_reserve_exact(additional)
        .map_err(|_| SearchError::AllocationFailure { what, count: len })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huge_allocation_fails() {
        let result = filled_vec(usize::max_value() / 2, 0u64, "test buffer");
        assert_eq!(
            result,
            Err(SearchError::AllocationFailure {
                what: "test buffer",
                count: usize::max_value() / 2
            })
        );
    }

    #[test]
    fn small_allocation() {
        assert_eq!(filled_vec(3, true, "flags"), Ok(vec![true; 3]));
    }
}
