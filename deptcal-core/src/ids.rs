//! Document id derivation.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::{DeptCalError, DeptCalResult};

/// Make a department id safe to embed in a document id.
/// A `/` would be read as a path separator by the store.
pub fn safe_dept_id(department_id: &str) -> String {
    department_id.replace('/', "_")
}

/// Fail when two distinct departments in `targets` would share a sibling id,
/// e.g. `a/b` and `a_b`.
pub fn check_distinct_dept_ids(targets: &[String]) -> DeptCalResult<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for department_id in targets {
        let suffix = safe_dept_id(department_id);
        match seen.get(&suffix) {
            Some(first) if *first != department_id.as_str() => {
                return Err(DeptCalError::DepartmentIdCollision {
                    first: first.to_string(),
                    second: department_id.clone(),
                    suffix,
                });
            }
            Some(_) => {}
            None => {
                seen.insert(suffix, department_id);
            }
        }
    }
    Ok(())
}

/// Id of the document for `department_id` within one occurrence.
///
/// The primary department keeps the occurrence's base id; every other
/// department gets `base_id + "_" + department`.
pub fn sibling_id(base_id: &str, department_id: &str, primary_department_id: &str) -> String {
    if department_id == primary_department_id {
        base_id.to_string()
    } else {
        format!("{}_{}", base_id, safe_dept_id(department_id))
    }
}

/// Base id of occurrence `index` (0-based) in a series started by `series_id`.
pub fn occurrence_base_id(series_id: &str, index: usize) -> String {
    if index == 0 {
        series_id.to_string()
    } else {
        format!("{}_r{}", series_id, index + 1)
    }
}

/// A fresh linked-group id.
pub fn new_group_id() -> String {
    format!("group_{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_dept_id() {
        assert_eq!(safe_dept_id("math/upper"), "math_upper");
        assert_eq!(safe_dept_id("a/b/c"), "a_b_c");
        assert_eq!(safe_dept_id("english"), "english");
    }

    #[test]
    fn test_sibling_id() {
        assert_eq!(sibling_id("evt", "math", "math"), "evt");
        assert_eq!(sibling_id("evt", "science", "math"), "evt_science");
        assert_eq!(sibling_id("evt", "hs/science", "math"), "evt_hs_science");
    }

    #[test]
    fn test_occurrence_base_id() {
        assert_eq!(occurrence_base_id("evt", 0), "evt");
        assert_eq!(occurrence_base_id("evt", 1), "evt_r2");
        assert_eq!(occurrence_base_id("evt", 9), "evt_r10");
    }

    #[test]
    fn group_ids_are_unique() {
        let a = new_group_id();
        let b = new_group_id();
        assert!(a.starts_with("group_"));
        assert_ne!(a, b);
    }

    #[test]
    fn colliding_departments_are_rejected() {
        let targets = vec!["hs/math".to_string(), "art".to_string(), "hs_math".to_string()];
        let err = check_distinct_dept_ids(&targets).unwrap_err();
        assert!(matches!(
            err,
            DeptCalError::DepartmentIdCollision { ref first, ref second, ref suffix }
                if first == "hs/math" && second == "hs_math" && suffix == "hs_math"
        ));

        let distinct = vec!["hs/math".to_string(), "hs/art".to_string(), "hs/math".to_string()];
        assert!(check_distinct_dept_ids(&distinct).is_ok());
    }
}
