//! Argument iterator & builder: walks a platform argv in order, synthesizes
//! a platform-correct one for spawning children, and supports
//! "duplicate-and-substitute-first" re-exec with a different argv\[0\].

use crate::arena::{Arena, ArenaError};
use crate::string::Str8;
#[cfg(windows)]
use crate::string::Str16;

/// Walks a POSIX-style argument array in order. The null-sentinel in the
/// original C array is just the end of this slice — callers never see it.
#[must_use]
pub fn iterate_posix<'a>(argv: &'a [Str8<'a>]) -> impl Iterator<Item = Str8<'a>> + 'a {
    argv.iter().copied()
}

/// Tokenizes one flat Windows command line into code-unit spans, quote-aware:
/// a leading `"` consumes up to the matching `"` (contents exclusive of the
/// quotes); otherwise the token runs to the next space. Runs of spaces
/// between tokens are skipped before the next token starts.
#[must_use]
pub fn parse_windows_command_line(units: &[u16]) -> Vec<(usize, usize)> {
    const QUOTE: u16 = b'"' as u16;
    const SPACE: u16 = b' ' as u16;

    let mut spans = Vec::new();
    let mut i = 0usize;
    let len = units.len();

    while i < len {
        while i < len && units[i] == SPACE {
            i += 1;
        }
        if i >= len {
            break;
        }
        if units[i] == QUOTE {
            let start = i + 1;
            let mut j = start;
            while j < len && units[j] != QUOTE {
                j += 1;
            }
            spans.push((start, j));
            i = if j < len { j + 1 } else { j };
        } else {
            let start = i;
            let mut j = i;
            while j < len && units[j] != SPACE {
                j += 1;
            }
            spans.push((start, j));
            i = j;
        }
    }
    spans
}

/// [`parse_windows_command_line`], sliced back into [`Str16`]s over the
/// same backing buffer as `command_line`.
#[cfg(windows)]
#[must_use]
pub fn windows_tokens<'a>(command_line: Str16<'a>) -> Vec<Str16<'a>> {
    parse_windows_command_line(command_line.as_units())
        .into_iter()
        .map(|(start, end)| command_line.slice(start, end))
        .collect()
}

/// Copies `s` into `arena`, optionally null-terminating it, and returns a
/// slice over the arena's storage. Equivalent to [`Str8::duplicate_arena`],
/// but built on `Arena::allocate`'s raw pointer (rather than
/// `allocate_slice`'s `&mut`-borrowed slice) so it can be called
/// repeatedly against the same arena within one caller — the arena's
/// backing memory is a stable virtual reservation, so a pointer into it
/// stays valid independent of any single allocating call's borrow.
fn duplicate_into_arena<'b>(s: &Str8<'_>, arena: &mut Arena, null_terminate: bool) -> Result<Str8<'b>, ArenaError> {
    let bytes = s.as_units();
    let extra = usize::from(null_terminate);
    let ptr = arena.allocate(bytes.len() + extra, 1)?;
    unsafe {
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, bytes.len());
        if null_terminate {
            *ptr.add(bytes.len()) = 0;
        }
        Ok(Str8::from_pointer_length(ptr, bytes.len()))
    }
}

/// Accumulates `args` into one arena, each duplicated and null-terminated,
/// returning the POSIX-style list of owned slices a caller then turns into
/// a pointer array.
pub fn build_argv<'b>(args: &[&str], arena: &'b mut Arena) -> Result<Vec<Str8<'b>>, ArenaError> {
    let mut out = Vec::with_capacity(args.len());
    for a in args {
        out.push(duplicate_into_arena(&Str8::from_str(a), arena, true)?);
    }
    Ok(out)
}

/// Builds one flat, space-separated Windows command line with a single zero
/// terminator (no trailing space), matching the builder's Windows branch.
#[cfg(windows)]
pub fn build_command_line<'b>(args: &[&str], arena: &'b mut Arena) -> Result<Str16<'b>, ArenaError> {
    let joined = args.join(" ");
    Str8::from_str(&joined).to_utf16_arena(arena)
}

/// Produces a new argv where `existing`'s first argument is replaced by
/// `new_first` and the rest of `existing` is appended after it — used to
/// re-spawn a process with a different argv\[0\] (e.g. the real executable
/// path in place of a symlink name).
pub fn duplicate_and_substitute_first<'b>(
    existing: &[Str8<'_>],
    new_first: &str,
    arena: &'b mut Arena,
) -> Result<Vec<Str8<'b>>, ArenaError> {
    let mut out = Vec::with_capacity(existing.len().max(1));
    out.push(duplicate_into_arena(&Str8::from_str(new_first), arena, true)?);
    for arg in existing.iter().skip(1) {
        out.push(duplicate_into_arena(arg, arena, true)?);
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn posix_iterator_returns_slots_in_order() {
        let args = [Str8::from_str("clang"), Str8::from_str("-o"), Str8::from_str("out")];
        let collected: Vec<_> = iterate_posix(&args).map(|s| s.as_str().into_owned()).collect();
        assert_eq!(collected, vec!["clang", "-o", "out"]);
    }

    #[test]
    fn windows_command_line_splits_on_spaces() {
        let line: Vec<u16> = "clang -o out".encode_utf16().collect();
        let spans = parse_windows_command_line(&line);
        assert_eq!(spans, vec![(0, 5), (6, 8), (9, 12)]);
    }

    #[test]
    fn windows_command_line_honors_quoted_spans() {
        let line: Vec<u16> = "clang \"-o out.exe\" next".encode_utf16().collect();
        let spans = parse_windows_command_line(&line);
        let tokens: Vec<String> = spans
            .iter()
            .map(|&(s, e)| String::from_utf16_lossy(&line[s..e]))
            .collect();
        assert_eq!(tokens, vec!["clang", "-o out.exe", "next"]);
    }

    #[test]
    fn build_argv_duplicates_each_argument_into_the_arena() {
        let mut arena = Arena::create(1024 * 1024, 4096, 4096).unwrap();
        let built = build_argv(&["clang", "-c", "main.c"], &mut arena).unwrap();
        assert_eq!(built.len(), 3);
        assert_eq!(built[1].as_str(), "-c");
    }

    #[test]
    fn duplicate_and_substitute_first_replaces_only_argv0() {
        let mut source_arena = Arena::create(1024 * 1024, 4096, 4096).unwrap();
        let original = build_argv(&["symlink-name", "-o", "out"], &mut source_arena).unwrap();

        let mut arena = Arena::create(1024 * 1024, 4096, 4096).unwrap();
        let substituted =
            duplicate_and_substitute_first(&original, "/usr/bin/real-clang", &mut arena).unwrap();

        assert_eq!(substituted[0].as_str(), "/usr/bin/real-clang");
        assert_eq!(substituted[1].as_str(), "-o");
        assert_eq!(substituted[2].as_str(), "out");
    }
}
