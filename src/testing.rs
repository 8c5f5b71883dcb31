//! Shared test fixtures.
//!
//! A 5-accession collection genotyped at 7 multi-allelic markers (3, 2, 3,
//! 4, 3, 2 and 2 alleles), the same collection scored at 7 biallelic
//! markers, and a 5 x 5 distance matrix.

use crate::models::AccessionHeader;

const THIRD: f64 = 1.0 / 3.0;

pub(crate) fn headers() -> Vec<AccessionHeader> {
    let names = [Some("Alice"), None, Some("Bob"), Some("Carol"), Some("Bob")];
    let ids = [Some("acc-1"), Some("acc-2"), Some("acc-3"), None, Some("acc-5")];
    ids.iter()
        .zip(names.iter())
        .map(|(id, name)| {
            AccessionHeader::from_parts(id.map(str::to_string), name.map(str::to_string))
        })
        .collect()
}

pub(crate) fn marker_names() -> Vec<Option<String>> {
    (1..=7).map(|m| Some(format!("mk{m}"))).collect()
}

fn named(names: &[Option<&str>]) -> Vec<Option<String>> {
    names.iter().map(|n| n.map(str::to_string)).collect()
}

pub(crate) fn allele_names() -> Vec<Vec<Option<String>>> {
    vec![
        named(&[Some("mk1-1"), Some("mk1-2"), Some("mk1-3")]),
        named(&[Some("mk2-1"), Some("mk2-2")]),
        named(&[None, Some("mk3-2"), None]),
        named(&[Some("mk4-1"), Some("mk4-2"), Some("mk4-3"), Some("mk4-4")]),
        named(&[None, Some("mk5-2"), Some("mk5-3")]),
        named(&[Some("mk6-1"), Some("mk6-2")]),
        named(&[Some("mk7-1"), Some("mk7-2")]),
    ]
}

fn row(markers: &[&[Option<f64>]]) -> Vec<Vec<Option<f64>>> {
    markers.iter().map(|m| m.to_vec()).collect()
}

pub(crate) fn frequencies() -> Vec<Vec<Vec<Option<f64>>>> {
    let t = Some(THIRD);
    vec![
        row(&[
            &[None, None, None],
            &[Some(0.5), Some(0.5)],
            &[Some(0.0), Some(0.5), Some(0.5)],
            &[Some(0.0), Some(0.0), Some(0.5), Some(0.5)],
            &[None, None, None],
            &[Some(0.0), Some(1.0)],
            &[Some(1.0), Some(0.0)],
        ]),
        row(&[
            &[Some(1.0), Some(0.0), Some(0.0)],
            &[Some(0.5), Some(0.5)],
            &[Some(0.0), Some(0.5), Some(0.5)],
            &[Some(1.0), Some(0.0), Some(0.0), Some(0.0)],
            &[t, t, t],
            &[Some(1.0), Some(0.0)],
            &[Some(0.0), Some(1.0)],
        ]),
        row(&[
            &[Some(0.6), Some(0.0), Some(0.4)],
            &[Some(0.5), Some(0.5)],
            &[Some(0.0), Some(0.5), Some(0.5)],
            &[Some(0.25), Some(0.25), Some(0.25), Some(0.25)],
            &[Some(0.0), Some(0.5), Some(0.5)],
            &[Some(0.0), Some(1.0)],
            &[Some(1.0), Some(0.0)],
        ]),
        row(&[
            &[None, None, None],
            &[Some(1.0), Some(0.0)],
            &[None, None, None],
            &[Some(0.0), Some(0.0), Some(1.0), Some(0.0)],
            &[t, t, t],
            &[Some(0.0), Some(1.0)],
            &[Some(1.0), Some(0.0)],
        ]),
        row(&[
            &[t, t, t],
            &[Some(0.5), Some(0.5)],
            &[Some(0.0), Some(0.5), Some(0.5)],
            &[Some(0.5), Some(0.0), Some(0.5), Some(0.0)],
            &[t, t, t],
            &[Some(1.0), Some(0.0)],
            &[None, None],
        ]),
    ]
}

pub(crate) fn biallelic_scores() -> Vec<Vec<Option<u32>>> {
    vec![
        vec![Some(1), Some(0), Some(2), Some(1), Some(1), Some(0), Some(0)],
        vec![Some(2), Some(0), Some(2), Some(0), Some(1), Some(2), Some(1)],
        vec![Some(1), Some(0), None, Some(0), Some(1), Some(1), Some(0)],
        vec![Some(1), Some(0), Some(1), Some(1), Some(1), Some(2), None],
        vec![Some(1), Some(0), None, Some(0), None, Some(2), Some(0)],
    ]
}

pub(crate) fn biallelic_frequencies() -> Vec<Vec<Vec<Option<f64>>>> {
    let (h, r, a) = (
        &[Some(0.5), Some(0.5)][..],
        &[Some(1.0), Some(0.0)][..],
        &[Some(0.0), Some(1.0)][..],
    );
    let m: &[Option<f64>] = &[None, None];
    vec![
        row(&[h, r, a, h, h, r, r]),
        row(&[a, r, a, r, h, a, h]),
        row(&[h, r, m, r, h, h, r]),
        row(&[h, r, h, h, h, a, m]),
        row(&[h, r, m, r, m, a, r]),
    ]
}

pub(crate) fn distances() -> Vec<Vec<f64>> {
    vec![
        vec![0.0, 0.2, 0.4, 0.6, 0.8],
        vec![0.2, 0.0, 0.2, 0.4, 0.6],
        vec![0.4, 0.2, 0.0, 0.1, 0.4],
        vec![0.6, 0.4, 0.1, 0.0, 0.2],
        vec![0.8, 0.6, 0.4, 0.2, 0.0],
    ]
}
