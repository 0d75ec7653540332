//! C3 linearization of class precedence lists.
//!
//! The precedence list (MRO) of a class is the class itself followed by the
//! C3 merge of its bases' precedence lists together with the list of bases.
//! The merge repeatedly takes the first head that does not occur in the tail
//! of any sequence; when no such head exists the hierarchy has no consistent
//! order.

use thiserror::Error;

use crate::hierarchy::ClassId;

/// A method resolution order: most specific class first.
pub type Mro = Vec<ClassId>;

/// Low-level linearization failures.
///
/// These carry raw ids; [`ClassHierarchy`](crate::ClassHierarchy) translates
/// them into named errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MroError {
    #[error("base {0} has no precedence list")]
    UnknownBase(ClassId),

    #[error("duplicate base {0}")]
    DuplicateBase(ClassId),

    #[error("no consistent method resolution order for heads {pending:?}")]
    Inconsistent { pending: Vec<ClassId> },
}

/// Compute the precedence list of `class_id` given its direct `bases`.
///
/// `mro_lookup` returns the already computed precedence list of a base.
pub fn compute_c3_mro<'a, F>(
    class_id: ClassId,
    bases: &[ClassId],
    mro_lookup: F,
) -> Result<Mro, MroError>
where
    F: Fn(ClassId) -> Option<&'a [ClassId]>,
{
    for (i, base) in bases.iter().enumerate() {
        if bases[..i].contains(base) {
            return Err(MroError::DuplicateBase(*base));
        }
    }

    let mut sequences = Vec::with_capacity(bases.len() + 1);
    for &base in bases {
        let mro = mro_lookup(base).ok_or(MroError::UnknownBase(base))?;
        sequences.push(mro.to_vec());
    }
    sequences.push(bases.to_vec());

    let mut mro = Vec::with_capacity(sequences.iter().map(Vec::len).sum::<usize>() + 1);
    mro.push(class_id);
    mro.extend(c3_merge(&sequences)?);
    Ok(mro)
}

/// Merge precedence sequences with the C3 rule.
pub fn c3_merge(sequences: &[Vec<ClassId>]) -> Result<Mro, MroError> {
    let mut merged = Vec::new();
    let mut starts = vec![0usize; sequences.len()];

    loop {
        if sequences.iter().zip(&starts).all(|(seq, &start)| start >= seq.len()) {
            return Ok(merged);
        }

        let in_some_tail = |candidate: ClassId| {
            sequences.iter().zip(&starts).any(|(seq, &start)| {
                seq.get(start + 1..)
                    .is_some_and(|tail| tail.contains(&candidate))
            })
        };

        let next = sequences
            .iter()
            .zip(&starts)
            .filter_map(|(seq, &start)| seq.get(start).copied())
            .find(|&candidate| !in_some_tail(candidate));

        let Some(next) = next else {
            let mut pending: Vec<ClassId> = sequences
                .iter()
                .zip(&starts)
                .filter_map(|(seq, &start)| seq.get(start).copied())
                .collect();
            pending.dedup();
            return Err(MroError::Inconsistent { pending });
        };

        merged.push(next);
        for (seq, start) in sequences.iter().zip(starts.iter_mut()) {
            if seq.get(*start) == Some(&next) {
                *start += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> ClassId {
        ClassId::from_raw(n)
    }

    #[test]
    fn test_merge_single_chain() {
        let merged = c3_merge(&[vec![id(1), id(0)], vec![id(1)]]).unwrap();
        assert_eq!(merged, vec![id(1), id(0)]);
    }

    #[test]
    fn test_merge_diamond() {
        // D(B, C), B(A), C(A)
        let b = vec![id(2), id(1), id(0)];
        let c = vec![id(3), id(1), id(0)];
        let merged = c3_merge(&[b, c, vec![id(2), id(3)]]).unwrap();
        assert_eq!(merged, vec![id(2), id(3), id(1), id(0)]);
    }

    #[test]
    fn test_merge_inconsistent() {
        // X(A, B) and Y(B, A) cannot share a subclass.
        let x = vec![id(3), id(1), id(2), id(0)];
        let y = vec![id(4), id(2), id(1), id(0)];
        let err = c3_merge(&[x, y, vec![id(3), id(4)]]).unwrap_err();
        assert!(matches!(err, MroError::Inconsistent { .. }));
    }

    #[test]
    fn test_compute_rejects_duplicate_base() {
        let object = [id(0)];
        let err = compute_c3_mro(id(5), &[id(0), id(0)], |_| Some(&object[..])).unwrap_err();
        assert_eq!(err, MroError::DuplicateBase(id(0)));
    }

    #[test]
    fn test_compute_rejects_unknown_base() {
        let err = compute_c3_mro(id(5), &[id(9)], |_| None).unwrap_err();
        assert_eq!(err, MroError::UnknownBase(id(9)));
    }

    #[test]
    fn test_compute_prepends_class() {
        let object = [id(0)];
        let mro = compute_c3_mro(id(1), &[id(0)], |_| Some(&object[..])).unwrap();
        assert_eq!(mro, vec![id(1), id(0)]);
    }
}
