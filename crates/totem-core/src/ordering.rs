//! # Catalog Ordering
//!
//! Counters are shown in a natural order: by the number embedded in their
//! label, then by floor, then by name. Labels are free text (`"Módulo 12"`,
//! `"Planta 2"`), so only their digits take part in the numeric comparison.
//! Counters without digits sort after every numbered counter.

use std::cmp::Ordering;

use crate::records::Modulo;

/// Numeric value of all ASCII digits in `label`, read in order.
///
/// `"Módulo 12"` → `Some(12)`, `"Planta baja"` → `None`. Numbers too large
/// for `u64` saturate, so they still sort after every smaller number.
pub fn label_number(label: Option<&str>) -> Option<u64> {
    let digits: String = label?.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    // Only ASCII digits remain, so parsing can fail only on overflow.
    Some(digits.parse().unwrap_or(u64::MAX))
}

/// Compare two optional numbers with `None` sorting last.
fn missing_last(a: Option<u64>, b: Option<u64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Canonical counter order: number, floor, case-insensitive name, id.
pub fn modulo_order(a: &Modulo, b: &Modulo) -> Ordering {
    missing_last(
        label_number(a.numero.as_deref()),
        label_number(b.numero.as_deref()),
    )
    .then_with(|| {
        missing_last(
            label_number(a.piso.as_deref()),
            label_number(b.piso.as_deref()),
        )
    })
    .then_with(|| a.nombre.to_lowercase().cmp(&b.nombre.to_lowercase()))
    .then_with(|| a.id.cmp(&b.id))
}

/// Sort counters in place into canonical order.
pub fn sort_modulos(modulos: &mut [Modulo]) {
    modulos.sort_by(modulo_order);
}

/// Sort order for a requirement appended after `existing` ones.
pub fn next_sort_order(existing: impl IntoIterator<Item = i32>) -> i32 {
    existing
        .into_iter()
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modulo(id: i64, nombre: &str, numero: Option<&str>, piso: Option<&str>) -> Modulo {
        Modulo {
            id,
            nombre: nombre.to_string(),
            numero: numero.map(String::from),
            piso: piso.map(String::from),
            icono: None,
        }
    }

    #[test]
    fn label_number_reads_digits() {
        assert_eq!(label_number(Some("Módulo 12")), Some(12));
        assert_eq!(label_number(Some("1-B2")), Some(12));
        assert_eq!(label_number(Some("Planta baja")), None);
        assert_eq!(label_number(None), None);
    }

    #[test]
    fn oversized_numbers_saturate() {
        assert_eq!(
            label_number(Some("Módulo 123456789012345678901234")),
            Some(u64::MAX)
        );
        assert_eq!(label_number(Some("0000000000000000000000007")), Some(7));

        let mut list = vec![
            modulo(1, "Recepción", None, None),
            modulo(2, "Caja", Some("99999999999999999999999"), None),
            modulo(3, "Archivo", Some("7"), None),
        ];
        sort_modulos(&mut list);
        let ids: Vec<i64> = list.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn numbers_sort_numerically_not_lexically() {
        let mut list = vec![
            modulo(1, "A", Some("Módulo 10"), None),
            modulo(2, "B", Some("Módulo 2"), None),
        ];
        sort_modulos(&mut list);
        assert_eq!(list[0].id, 2);
        assert_eq!(list[1].id, 1);
    }

    #[test]
    fn unnumbered_counters_sort_last() {
        let mut list = vec![
            modulo(1, "Recepción", None, None),
            modulo(2, "Caja", Some("5"), None),
        ];
        sort_modulos(&mut list);
        assert_eq!(list[0].id, 2);
    }

    #[test]
    fn ties_break_on_floor_then_name_then_id() {
        let mut list = vec![
            modulo(4, "beta", Some("1"), Some("Piso 2")),
            modulo(3, "Alfa", Some("1"), Some("Piso 2")),
            modulo(2, "Zeta", Some("1"), Some("Piso 1")),
            modulo(1, "alfa", Some("1"), Some("Piso 2")),
        ];
        sort_modulos(&mut list);
        let ids: Vec<i64> = list.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 1, 3, 4]);
    }

    #[test]
    fn next_sort_order_starts_at_zero() {
        assert_eq!(next_sort_order(Vec::new()), 0);
        assert_eq!(next_sort_order(vec![0, 3, 1]), 4);
    }
}
