//! # Identifier Rules
//!
//! Key, event and custom type names become C++ identifiers in generated code.
//! The validators and the emitter share these helpers so that a name accepted
//! by validation always maps to the same generated identifiers.

/// `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// C++17 keywords and alternative operator tokens. None of these may name a
/// generated type, member or namespace.
pub const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char16_t", "char32_t", "class", "compl", "const", "const_cast",
    "constexpr", "continue", "decltype", "default", "delete", "do", "double", "dynamic_cast",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
    "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
    "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
    "reinterpret_cast", "return", "short", "signed", "sizeof", "static", "static_assert",
    "static_cast", "struct", "switch", "template", "this", "thread_local", "throw", "true",
    "try", "typedef", "typeid", "typename", "union", "unsigned", "using", "virtual", "void",
    "volatile", "wchar_t", "while", "xor", "xor_eq",
];

pub fn is_cpp_keyword(name: &str) -> bool {
    CPP_KEYWORDS.contains(&name)
}

/// One or more identifiers joined by `::`, e.g. `mxrc::ipc`. Keywords are
/// not allowed as segments.
pub fn is_namespace_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .split("::")
            .all(|segment| is_identifier(segment) && !is_cpp_keyword(segment))
}

/// Name of the generated string constant: `robot_position` → `ROBOT_POSITION`.
pub fn constant_case(name: &str) -> String {
    name.to_ascii_uppercase()
}

/// Name of a generated type: `robot_position` → `RobotPosition`.
///
/// Segments between underscores are capitalized and joined; the rest of each
/// segment is kept as written, so `RTDeadlineMiss` stays unchanged.
pub fn pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for segment in name.split('_').filter(|s| !s.is_empty()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }
    out
}
