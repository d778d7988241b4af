//! Orden de listados: carpetas primero, luego comparación "natural" del nombre
//! sin distinguir mayúsculas ni tildes ("2" antes que "10").

use std::cmp::Ordering;

use crate::codec::fold;

/// Compara nombres para mostrar. A igualdad plegada desempata el nombre crudo,
/// así el orden es total y determinista.
///
/// El plegado quita tildes, así que `ñ` ordena como `n` ("Ñandú" junto a
/// "Nandu") y no después de `n` como en la collation española.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    natural_cmp(&fold(a), &fold(b)).then_with(|| a.cmp(b))
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let lhs = take_digits(&mut left);
                let rhs = take_digits(&mut right);
                let ord = cmp_numeric(&lhs, &rhs);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

/// Compara dos tiras de dígitos por valor sin parsear (no hay overflow).
fn cmp_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Partición estable carpetas/ficheros y orden por nombre dentro de cada grupo.
pub fn sort_folders_first<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> (bool, &str),
{
    items.sort_by(|a, b| {
        let (a_folder, a_name) = key(a);
        let (b_folder, b_name) = key(b);
        b_folder
            .cmp(&a_folder)
            .then_with(|| compare_names(a_name, b_name))
    });
}
