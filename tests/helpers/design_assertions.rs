//! Assertion helpers over designs.

use edgram::Design;

/// Relationships as `from op to` strings, in declaration order.
pub fn edges(design: &Design) -> Vec<String> {
    design
        .relationships()
        .iter()
        .map(|r| {
            format!(
                "{} {} {}",
                design.name_of(r.from),
                r.kind.operator(),
                design.name_of(r.to)
            )
        })
        .collect()
}

pub fn factor_names(design: &Design) -> Vec<String> {
    design.factors().map(|(_, f)| f.name.to_string()).collect()
}

#[track_caller]
pub fn assert_same_structure(left: &Design, right: &Design) {
    assert_eq!(factor_names(left), factor_names(right), "factor sets differ");
    assert_eq!(edges(left), edges(right), "relationship sets differ");
    assert_eq!(
        left.count_observations(),
        right.count_observations(),
        "observation counts differ"
    );
}
