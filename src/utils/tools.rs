/// Quote a single argument so it can be pasted into a POSIX shell.
/// Only used for display; arguments are always passed to the child as a vector.
pub fn shell_quote(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }
    let is_safe = arg
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c));
    if is_safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r#"'"'"'"#))
    }
}

/// Render a program and its arguments as a copy-pasteable command line
pub fn display_command<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(AsRef::as_ref))
        .map(shell_quote)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Join a parent path and a child name the way the remote expects it.
/// An empty parent means the remote root, so no leading separator is added.
pub fn join_remote_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), name)
    }
}

/// `remote:path` location understood by rclone
pub fn remote_location(remote_name: &str, path: &str) -> String {
    format!("{}:{}", remote_name, path)
}
