use super::model::LabelScheme;

/// File name without its final extension (`a_b.mzXML` → `a_b`).
fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(pos) => &file_name[..pos],
    }
}

/// Pick the `_`-separated token at `split_index` from a file name stripped of
/// its extension. Negative indices count from the end (`-1` is the last token).
///
/// Returns `None` when the index is out of range. An empty token (`a__b` at
/// index 1) is a valid, empty label.
pub fn derive_label(file_name: &str, split_index: i64) -> Option<String> {
    let tokens: Vec<&str> = strip_extension(file_name).split('_').collect();
    let n = tokens.len() as i64;
    let idx = if split_index < 0 { n + split_index } else { split_index };
    if !(0..n).contains(&idx) {
        return None;
    }
    Some(tokens[idx as usize].to_string())
}

/// Label every file with [`derive_label`]. If derivation fails for any of
/// them, every file is labelled with its unmodified name instead.
pub fn derive_labels<S: AsRef<str>>(files: &[S], split_index: i64) -> (Vec<String>, LabelScheme) {
    let derived: Option<Vec<String>> = files
        .iter()
        .map(|f| derive_label(f.as_ref(), split_index))
        .collect();

    match derived {
        Some(labels) => (labels, LabelScheme::Derived),
        None => {
            log::warn!(
                "split index {split_index} does not yield a label for every file; labelling by file name"
            );
            let labels = files.iter().map(|f| f.as_ref().to_string()).collect();
            (labels, LabelScheme::FileName)
        }
    }
}
