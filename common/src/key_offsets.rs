//! Ring members are referenced by their global output index. Transactions store the first
//! index followed by the difference to each previous one, which keeps the varints short.

/// Converts strictly increasing absolute offsets to relative ones
///
/// Returns `None` if the offsets are not strictly increasing
pub fn absolute_to_relative(offsets: &[u64]) -> Option<Vec<u64>> {
    let mut previous: Option<u64> = None;
    offsets
        .iter()
        .map(|&offset| {
            let relative = match previous {
                Some(previous) if offset <= previous => return None,
                Some(previous) => offset - previous,
                None => offset,
            };
            previous = Some(offset);
            Some(relative)
        })
        .collect()
}

/// Converts relative offsets back to absolute ones
///
/// Returns `None` if the sum overflows
pub fn relative_to_absolute(offsets: &[u64]) -> Option<Vec<u64>> {
    let mut sum: u64 = 0;
    offsets
        .iter()
        .map(|&offset| {
            sum = sum.checked_add(offset)?;
            Some(sum)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_compresses_offsets() {
        assert_eq!(
            absolute_to_relative(&[5, 9, 10, 150, 1000]),
            Some(vec![5, 4, 1, 140, 850])
        );
        assert_eq!(absolute_to_relative(&[]), Some(vec![]));
    }

    #[test]
    fn it_restores_absolute_offsets() {
        for offsets in &[vec![0], vec![0, 1, 2], vec![7, 1024, 1025, 99_999, u64::max_value()]] {
            let relative = absolute_to_relative(offsets).unwrap();
            assert_eq!(relative_to_absolute(&relative).unwrap(), *offsets);
        }
    }

    #[test]
    fn it_rejects_unsorted_offsets() {
        assert_eq!(absolute_to_relative(&[5, 3, 8]), None);
        assert_eq!(absolute_to_relative(&[5, 5]), None);
        assert_eq!(relative_to_absolute(&[u64::max_value(), 1]), None);
    }
}
