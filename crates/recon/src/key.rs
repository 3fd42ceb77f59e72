use crate::config::KeySplit;

/// Split a composite `<id>.<version>` key.
///
/// Without a dot the whole key is the id and the version is empty.
/// `format!("{id}.{version}")` reproduces the key whenever a dot was present.
pub fn split_key(key: &str, mode: KeySplit) -> (&str, &str) {
    let pos = match mode {
        KeySplit::Last => key.rfind('.'),
        KeySplit::First => key.find('.'),
    };
    match pos {
        Some(i) => (&key[..i], &key[i + 1..]),
        None => (key, ""),
    }
}
