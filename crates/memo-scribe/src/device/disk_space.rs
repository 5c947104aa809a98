use std::path::Path;

use sysinfo::Disks;

/// Free bytes on the volume holding `path`, if one can be matched.
///
/// Picks the disk with the longest mount point that prefixes `path`.
pub(crate) fn available_space(path: &Path) -> Option<u64> {
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let disks = Disks::new_with_refreshed_list();

    disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| disk.available_space())
}
