use indexmap::IndexMap;
use itertools::Itertools;

use crate::{process::Particle, utils::enums::PlotTag};

/// Number repeated particles: every distinct name `x` seen `n` times becomes `x[1]`, ...,
/// `x[n]`. Names are numbered in order of first appearance.
pub fn tally(particles: &[Particle]) -> Vec<String> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for particle in particles {
        *counts.entry(particle.name.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .flat_map(|(name, count)| (1..=count).map(move |i| format!("{}[{}]", name, i)))
        .collect()
}

/// Every combination of two or more of the given labels, sorted lexicographically.
///
/// Each combination keeps the relative order of `labels`. Combinations made of the same set
/// of labels are only listed once.
pub fn combinations<S: AsRef<str>>(labels: &[S]) -> Vec<Vec<String>> {
    let mut combinations: Vec<Vec<String>> = (2..=labels.len())
        .flat_map(|size| {
            labels
                .iter()
                .map(|label| label.as_ref().to_string())
                .combinations(size)
        })
        .collect();
    combinations.sort();
    combinations
        .into_iter()
        .unique_by(|combination| combination.iter().sorted().cloned().collect::<Vec<_>>())
        .collect()
}

/// Plot directives for one stage of a process.
///
/// Intermediate particles get `PT`/`ETA` plots flagged `interstate`, visible final particles
/// get unflagged ones. Every combination of two or more of these particles gets an invariant
/// mass plot and every pair an angular distance plot, flagged `allstate` when there are no
/// intermediate particles. When invisible particles are present, each visible particle also
/// gets a transverse mass plot with the missing energy.
pub fn generate_plots(
    intermediate: &[Particle],
    final_state: &[Particle],
    invisible: &[Particle],
) -> Vec<String> {
    let inter_labels = tally(intermediate);
    let final_labels = tally(final_state);
    let mut lines = Vec::new();

    lines.push("# PT and ETA distributions of all particles".to_string());
    for part in &inter_labels {
        lines.push(format!("plot  PT({}) 40 0  500 [logY {}]", part, PlotTag::InterState));
        lines.push(format!("plot ETA({}) 40 -10 10 [logY {}]", part, PlotTag::InterState));
    }
    for part in &final_labels {
        lines.push(format!("plot  PT({}) 40 0  500 [logY]", part));
        lines.push(format!("plot ETA({}) 40 -10 10 [logY]", part));
    }

    let tag = if intermediate.is_empty() {
        PlotTag::AllState
    } else {
        PlotTag::Final
    };
    let all_labels: Vec<&String> = inter_labels.iter().chain(final_labels.iter()).collect();
    let combos = combinations(&all_labels);
    if !combos.is_empty() {
        lines.push("# Invariant-mass distributions".to_string());
        for combination in &combos {
            lines.push(format!(
                "plot M({}) 40 0  500 [logY {}]",
                combination.join(" "),
                tag
            ));
        }
        lines.push("# Angular distance distributions".to_string());
        for pair in combos.iter().filter(|c| c.len() == 2) {
            lines.push(format!("plot DELTAR({}) 40 0 10 [logY {}]", pair.join(","), tag));
        }
    }

    if !invisible.is_empty() {
        lines.push("# Invisible".to_string());
        for part in &inter_labels {
            lines.push(format!(
                "plot MT_MET({}) 40 0  500 [logY {}]",
                part,
                PlotTag::InterState
            ));
        }
        for part in &final_labels {
            lines.push(format!("plot MT_MET({}) 40 0  500 [logY]", part));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn particles(names: &[&str]) -> Vec<Particle> {
        names
            .iter()
            .map(|name| Particle {
                name: name.to_string(),
                pdg_codes: vec![],
            })
            .collect()
    }

    fn plot_lines(lines: &[String]) -> Vec<&str> {
        lines
            .iter()
            .filter(|line| line.starts_with("plot"))
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn tally_numbers_by_first_appearance() {
        assert_eq!(
            tally(&particles(&["j", "e+", "j", "j", "e+"])),
            vec!["j[1]", "j[2]", "j[3]", "e+[1]", "e+[2]"]
        );
        assert!(tally(&[]).is_empty());
    }

    #[test]
    fn combinations_are_sorted_and_unique() {
        let combos = combinations(&["b[1]", "a[1]", "c[1]"]);
        assert_eq!(
            combos,
            vec![
                vec!["a[1]", "c[1]"],
                vec!["b[1]", "a[1]"],
                vec!["b[1]", "a[1]", "c[1]"],
                vec!["b[1]", "c[1]"],
            ]
        );
        let combos = combinations(&["x[1]", "y[1]", "x[1]"]);
        assert_eq!(
            combos,
            vec![
                vec!["x[1]", "x[1]"],
                vec!["x[1]", "y[1]"],
                vec!["x[1]", "y[1]", "x[1]"],
            ]
        );
        assert!(combinations::<&str>(&[]).is_empty());
        assert!(combinations(&["a[1]"]).is_empty());
    }

    #[test]
    fn single_visible_particle() {
        let lines = generate_plots(&[], &particles(&["u"]), &[]);
        assert_eq!(
            lines,
            vec![
                "# PT and ETA distributions of all particles",
                "plot  PT(u[1]) 40 0  500 [logY]",
                "plot ETA(u[1]) 40 -10 10 [logY]",
            ]
        );
    }

    #[test]
    fn electron_and_neutrino() {
        let lines = generate_plots(&[], &particles(&["e-"]), &particles(&["ve~"]));
        assert_eq!(
            lines,
            vec![
                "# PT and ETA distributions of all particles",
                "plot  PT(e-[1]) 40 0  500 [logY]",
                "plot ETA(e-[1]) 40 -10 10 [logY]",
                "# Invisible",
                "plot MT_MET(e-[1]) 40 0  500 [logY]",
            ]
        );
    }

    #[test]
    fn neutrino_listed_among_final_particles() {
        let lines = generate_plots(&[], &particles(&["e-", "ve~"]), &particles(&["ve~"]));
        let masses = plot_lines(&lines)
            .into_iter()
            .filter(|line| line.starts_with("plot M("))
            .count();
        let distances = plot_lines(&lines)
            .into_iter()
            .filter(|line| line.starts_with("plot DELTAR("))
            .count();
        assert_eq!(masses, 1);
        assert_eq!(distances, 1);
        assert!(lines.contains(&"plot MT_MET(e-[1]) 40 0  500 [logY]".to_string()));
        assert!(lines.contains(&"plot MT_MET(ve~[1]) 40 0  500 [logY]".to_string()));
    }

    #[test]
    fn visible_pair_with_missing_energy() {
        let lines = generate_plots(&[], &particles(&["e-", "mu+"]), &particles(&["ve"]));
        assert_eq!(
            plot_lines(&lines),
            vec![
                "plot  PT(e-[1]) 40 0  500 [logY]",
                "plot ETA(e-[1]) 40 -10 10 [logY]",
                "plot  PT(mu+[1]) 40 0  500 [logY]",
                "plot ETA(mu+[1]) 40 -10 10 [logY]",
                "plot M(e-[1] mu+[1]) 40 0  500 [logY allstate]",
                "plot DELTAR(e-[1],mu+[1]) 40 0 10 [logY allstate]",
                "plot MT_MET(e-[1]) 40 0  500 [logY]",
                "plot MT_MET(mu+[1]) 40 0  500 [logY]",
            ]
        );
    }

    #[test]
    fn intermediate_particles() {
        let lines = generate_plots(&particles(&["t", "t~"]), &[], &[]);
        assert_eq!(
            lines,
            vec![
                "# PT and ETA distributions of all particles",
                "plot  PT(t[1]) 40 0  500 [logY interstate]",
                "plot ETA(t[1]) 40 -10 10 [logY interstate]",
                "plot  PT(t~[1]) 40 0  500 [logY interstate]",
                "plot ETA(t~[1]) 40 -10 10 [logY interstate]",
                "# Invariant-mass distributions",
                "plot M(t[1] t~[1]) 40 0  500 [logY ]",
                "# Angular distance distributions",
                "plot DELTAR(t[1],t~[1]) 40 0 10 [logY ]",
            ]
        );
        let lines = generate_plots(&particles(&["w+"]), &[], &particles(&["ve"]));
        assert_eq!(
            lines.last().unwrap(),
            "plot MT_MET(w+[1]) 40 0  500 [logY interstate]"
        );
    }

    proptest! {
        #[test]
        fn combination_count(counts in proptest::collection::vec(1usize..3, 0..4)) {
            let names = ["j", "b", "e-", "mu+"];
            let mut input = Vec::new();
            for (name, count) in names.iter().zip(&counts) {
                for _ in 0..*count {
                    input.push(*name);
                }
            }
            let m = input.len() as u32;
            let lines = generate_plots(&[], &particles(&input), &[]);
            let masses: Vec<&String> = lines.iter().filter(|l| l.starts_with("plot M(")).collect();
            let expected = 2usize.pow(m) - m as usize - 1;
            prop_assert_eq!(masses.len(), expected);
            let unique: std::collections::HashSet<&&String> = masses.iter().collect();
            prop_assert_eq!(unique.len(), masses.len());
            let singles = lines
                .iter()
                .filter(|l| l.starts_with("plot  PT(") || l.starts_with("plot ETA("))
                .count();
            prop_assert_eq!(singles, 2 * m as usize);
        }

        #[test]
        fn plots_are_deterministic(names in proptest::collection::vec("[a-z]{1,2}", 0..5)) {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            let first = generate_plots(&[], &particles(&names), &[]);
            let second = generate_plots(&[], &particles(&names), &[]);
            prop_assert_eq!(first, second);
        }
    }
}
