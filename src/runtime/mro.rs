// C3 linearization of class ancestry

use super::object::ObjectId;

/// Linearize `class` given the already-linearized ancestry of each base.
///
/// Returns `None` when no consistent order exists.
pub fn c3_linearize(class: ObjectId, bases: &[ObjectId], base_mros: &[Vec<ObjectId>]) -> Option<Vec<ObjectId>> {
    let mut sequences: Vec<Vec<ObjectId>> = base_mros.iter().filter(|m| !m.is_empty()).cloned().collect();
    if !bases.is_empty() {
        sequences.push(bases.to_vec());
    }

    let mut result = vec![class];
    loop {
        sequences.retain(|s| !s.is_empty());
        if sequences.is_empty() {
            return Some(result);
        }

        // First head that does not appear in the tail of any sequence
        let candidate = sequences
            .iter()
            .map(|s| s[0])
            .find(|head| !sequences.iter().any(|s| s[1..].contains(head)))?;

        result.push(candidate);
        for seq in sequences.iter_mut() {
            if seq[0] == candidate {
                seq.remove(0);
            }
        }
    }
}

/// Depth-first, duplicate-free order used when C3 fails
pub fn depth_first(class: ObjectId, base_mros: &[Vec<ObjectId>]) -> Vec<ObjectId> {
    let mut result = vec![class];
    for mro in base_mros {
        for &id in mro {
            if !result.contains(&id) {
                result.push(id);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: usize) -> ObjectId {
        ObjectId(n)
    }

    #[test]
    fn test_single_inheritance() {
        // 2 -> 1 -> 0
        let mro = c3_linearize(id(2), &[id(1)], &[vec![id(1), id(0)]]).unwrap();
        assert_eq!(mro, vec![id(2), id(1), id(0)]);
    }

    #[test]
    fn test_diamond() {
        // D(B, C), B(A), C(A), A(O)
        let o = id(0);
        let a = id(1);
        let b = id(2);
        let c = id(3);
        let d = id(4);
        let mro = c3_linearize(d, &[b, c], &[vec![b, a, o], vec![c, a, o]]).unwrap();
        assert_eq!(mro, vec![d, b, c, a, o]);
    }

    #[test]
    fn test_inconsistent_order() {
        // X(A, B) and Y(B, A); Z(X, Y) has no linearization
        let o = id(0);
        let a = id(1);
        let b = id(2);
        let x = id(3);
        let y = id(4);
        let z = id(5);
        let result = c3_linearize(z, &[x, y], &[vec![x, a, b, o], vec![y, b, a, o]]);
        assert!(result.is_none());
    }

    #[test]
    fn test_root_has_no_bases() {
        assert_eq!(c3_linearize(id(0), &[], &[]).unwrap(), vec![id(0)]);
    }

    #[test]
    fn test_depth_first_dedups() {
        let order = depth_first(id(5), &[vec![id(3), id(1), id(0)], vec![id(4), id(1), id(0)]]);
        assert_eq!(order, vec![id(5), id(3), id(1), id(0), id(4)]);
    }
}
