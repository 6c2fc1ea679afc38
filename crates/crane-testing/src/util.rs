use crate::listing::PATH_SEPARATOR;
use crate::schema::NodeTarget;

/// `package::targetName::targetType`
pub(crate) fn target_id(package_name: &str, target: &NodeTarget) -> String {
    format!(
        "{package_name}{PATH_SEPARATOR}{}{PATH_SEPARATOR}{}",
        target.target_name, target.target_type
    )
}

/// `parent::segment`; used for module suites and test cases alike.
pub(crate) fn child_id(parent_id: &str, segment: &str) -> String {
    let mut id = String::with_capacity(parent_id.len() + PATH_SEPARATOR.len() + segment.len());
    id.push_str(parent_id);
    id.push_str(PATH_SEPARATOR);
    id.push_str(segment);
    id
}

/// `true` if `id` names a node strictly below `ancestor_id`.
pub(crate) fn is_nested_id(id: &str, ancestor_id: &str) -> bool {
    id.strip_prefix(ancestor_id)
        .is_some_and(|rest| rest.starts_with(PATH_SEPARATOR))
}
