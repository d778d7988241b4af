//! Codificación de carpetas como segmentos de URL: `<slug>--<id>`.
//!
//! El slug es decorativo; el id (lo que sigue al **último** `--`) es lo único
//! que se usa para resolver. Así un enlace viejo sigue funcionando aunque la
//! carpeta se haya renombrado.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::models::Node;

pub const SEGMENT_DELIMITER: &str = "--";

/// Minúsculas + descomposición NFD sin marcas combinantes (quita tildes).
pub fn fold(s: &str) -> String {
    s.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// "Análisis_I (2024)" -> "analisis-i-2024"
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in fold(name).chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

pub fn encode_segment(name: &str, id: &str) -> String {
    format!("{}{SEGMENT_DELIMITER}{id}", slugify(name))
}

/// `true` si el segmento de `id` se decodifica de vuelta al mismo id. Falla
/// para ids vacíos, con `--` o que empiezan por `-`.
pub fn round_trips(name: &str, id: &str) -> bool {
    !id.is_empty() && decode_segment(&encode_segment(name, id)) == id
}

/// Segmento de una carpeta, o `None` si no es navegable (sin id o con un id
/// que no sobrevive a la codificación).
pub fn segment_of(node: &Node) -> Option<String> {
    node.id
        .as_deref()
        .filter(|id| round_trips(&node.name, id))
        .map(|id| encode_segment(&node.name, id))
}

/// Extrae el id de un segmento. Sin delimitador, el segmento entero es el id.
pub fn decode_segment(segment: &str) -> &str {
    match segment.rfind(SEGMENT_DELIMITER) {
        Some(idx) => &segment[idx + SEGMENT_DELIMITER.len()..],
        None => segment,
    }
}

/// Href relativo a la raíz del navegador; cada segmento va percent-encoded.
pub fn href<S: AsRef<str>>(segments: &[S]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }
    segments.iter().fold(String::new(), |mut acc, seg| {
        acc.push('/');
        acc.push_str(&urlencoding::encode(seg.as_ref()));
        acc
    })
}

/// Nombre para mostrar: "1_Sistemas_Digitales" -> "Sistemas Digitales".
pub fn clean_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let digits = spaced.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return spaced;
    }
    let rest = &spaced[digits..];
    let trimmed = rest.trim_start_matches(|c: char| c == '.' || c.is_whitespace());
    if trimmed.len() == rest.len() {
        spaced
    } else {
        trimmed.to_string()
    }
}
