//! UFS run sequence: the per-step schedule derived from the active components.
//!
//! Unlike the NEMS `runSeq` block, which lists the transfers declared on
//! a [`RunSequence`], this schedule is decided entirely by which components
//! are present:
//!
//! - without a mediator, each component steps in sequence order;
//! - with a mediator and a wave model, every prep phase and every
//!   `MED -> X` remap comes before the component steps, followed by the
//!   `X -> MED` remaps, the post phases, and history/restart writes;
//! - with a mediator and no wave model, each `X -> MED` remap is followed
//!   by its post phase, then prep phases, `MED -> X` remaps and steps.
//!   This branch writes neither history nor restart phases.
//!
//! Under a mediator, components follow the canonical order ATM, OCN, ICE,
//! WAV whatever order they were added in. Any other component (HYD)
//! follows them; it is remapped and post-processed like the others but
//! has no prep phase.

use std::fmt;

use crate::model::{EntryType, RemapMethod};

use super::sequence::RunSequence;

/// Components the mediator exchanges with, in schedule order.
const MEDIATED_ORDER: [EntryType; 4] = [
    EntryType::Atmospheric,
    EntryType::Ocean,
    EntryType::Ice,
    EntryType::Wave,
];

const HISTORY_WRITE: &str = "med_phases_history_write";
const RESTART_WRITE: &str = "med_phases_restart_write";

/// One coupling time step of a UFS configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UfsRunSequence {
    /// Active non-mediator components, in sequence order.
    pub components: Vec<EntryType>,
    pub mediator: bool,
    pub interval_seconds: i64,
    pub method: RemapMethod,
}

impl UfsRunSequence {
    pub fn from_sequence(sequence: &RunSequence, method: RemapMethod) -> Self {
        Self {
            components: sequence.components().map(|model| model.entry_type).collect(),
            mediator: sequence.mediator().is_some(),
            interval_seconds: sequence.interval_seconds(),
            method,
        }
    }

    /// Schedule lines between the `@N` header and the closing `@`, unindented.
    pub fn lines(&self) -> Vec<String> {
        if !self.mediator {
            return self
                .components
                .iter()
                .map(|component| component.code().to_string())
                .collect();
        }

        // Canonical components first, then the rest in sequence order.
        let mediated: Vec<EntryType> = MEDIATED_ORDER
            .into_iter()
            .filter(|component| self.components.contains(component))
            .chain(
                self.components
                    .iter()
                    .copied()
                    .filter(|component| !MEDIATED_ORDER.contains(component)),
            )
            .collect();

        let prep = mediated
            .iter()
            .flat_map(|&component| prep_phases(component))
            .map(|phase| mediator_phase(phase));
        let to_components = mediated
            .iter()
            .map(|&component| self.remap(EntryType::Mediator, component));
        let steps = mediated.iter().map(|component| component.code().to_string());

        let mut lines = Vec::new();
        if self.components.contains(&EntryType::Wave) {
            lines.extend(prep);
            lines.extend(to_components);
            lines.extend(steps);
            lines.extend(
                mediated
                    .iter()
                    .map(|&component| self.remap(component, EntryType::Mediator)),
            );
            lines.extend(mediated.iter().map(|&component| post_phase(component)));
            lines.push(mediator_phase(HISTORY_WRITE));
            lines.push(mediator_phase(RESTART_WRITE));
        } else {
            for &component in &mediated {
                lines.push(self.remap(component, EntryType::Mediator));
                lines.push(post_phase(component));
            }
            lines.extend(prep);
            lines.extend(to_components);
            lines.extend(steps);
        }
        lines
    }

    fn remap(&self, source: EntryType, target: EntryType) -> String {
        format!(
            "{} -> {} :remapMethod={}",
            source.code(),
            target.code(),
            self.method.code()
        )
    }
}

impl fmt::Display for UfsRunSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "runSeq::")?;
        writeln!(f, "@{}", self.interval_seconds)?;
        for line in self.lines() {
            writeln!(f, "  {line}")?;
        }
        writeln!(f, "@")?;
        f.write_str("::")
    }
}

/// Mediator preparation phases run before sending to `component`.
fn prep_phases(component: EntryType) -> &'static [&'static str] {
    match component {
        EntryType::Atmospheric => &["med_phases_prep_atm"],
        EntryType::Ocean => &["med_phases_prep_ocn_accum", "med_phases_prep_ocn_avg"],
        EntryType::Ice => &["med_phases_prep_ice"],
        EntryType::Wave => &["med_phases_prep_wav_accum", "med_phases_prep_wav_avg"],
        EntryType::Mediator | EntryType::Hydrological => &[],
    }
}

fn post_phase(component: EntryType) -> String {
    mediator_phase(&format!(
        "med_phases_post_{}",
        component.code().to_lowercase()
    ))
}

fn mediator_phase(phase: &str) -> String {
    format!("{} {phase}", EntryType::Mediator.code())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(components: &[EntryType], mediator: bool) -> UfsRunSequence {
        UfsRunSequence {
            components: components.to_vec(),
            mediator,
            interval_seconds: 1800,
            method: RemapMethod::default(),
        }
    }

    fn position(lines: &[String], line: &str) -> usize {
        lines
            .iter()
            .position(|l| l == line)
            .unwrap_or_else(|| panic!("missing line {line:?} in {lines:#?}"))
    }

    #[test]
    fn without_mediator_components_just_step() {
        let run = schedule(&[EntryType::Atmospheric, EntryType::Ocean], false);

        assert_eq!(run.lines(), ["ATM", "OCN"]);
        assert_eq!(run.to_string(), "runSeq::\n@1800\n  ATM\n  OCN\n@\n::");
        assert!(!run.to_string().contains("remapMethod"));
    }

    #[test]
    fn without_mediator_keeps_sequence_order() {
        let run = schedule(&[EntryType::Wave, EntryType::Atmospheric], false);
        assert_eq!(run.lines(), ["WAV", "ATM"]);
    }

    #[test]
    fn mediated_with_wave() {
        let run = schedule(
            &[EntryType::Wave, EntryType::Ocean, EntryType::Atmospheric],
            true,
        );

        assert_eq!(
            run.lines(),
            [
                "MED med_phases_prep_atm",
                "MED med_phases_prep_ocn_accum",
                "MED med_phases_prep_ocn_avg",
                "MED med_phases_prep_wav_accum",
                "MED med_phases_prep_wav_avg",
                "MED -> ATM :remapMethod=redist",
                "MED -> OCN :remapMethod=redist",
                "MED -> WAV :remapMethod=redist",
                "ATM",
                "OCN",
                "WAV",
                "ATM -> MED :remapMethod=redist",
                "OCN -> MED :remapMethod=redist",
                "WAV -> MED :remapMethod=redist",
                "MED med_phases_post_atm",
                "MED med_phases_post_ocn",
                "MED med_phases_post_wav",
                "MED med_phases_history_write",
                "MED med_phases_restart_write",
            ]
        );
    }

    #[test]
    fn mediated_with_wave_orders_remaps_around_steps() {
        let run = schedule(&[EntryType::Ocean, EntryType::Wave], true);
        let lines = run.lines();

        let last_inbound = ["MED -> OCN", "MED -> WAV"]
            .map(|prefix| position(&lines, &format!("{prefix} :remapMethod=redist")))
            .into_iter()
            .max()
            .unwrap();
        let steps = ["OCN", "WAV"].map(|step| position(&lines, step));
        let first_outbound = ["OCN -> MED", "WAV -> MED"]
            .map(|prefix| position(&lines, &format!("{prefix} :remapMethod=redist")))
            .into_iter()
            .min()
            .unwrap();

        assert!(steps.iter().all(|&s| last_inbound < s && s < first_outbound));
        assert!(!lines.iter().any(|l| l.contains("prep_atm")));
    }

    #[test]
    fn mediated_without_wave_uses_two_component_branch() {
        let run = schedule(&[EntryType::Atmospheric, EntryType::Ocean], true);

        assert_eq!(
            run.lines(),
            [
                "ATM -> MED :remapMethod=redist",
                "MED med_phases_post_atm",
                "OCN -> MED :remapMethod=redist",
                "MED med_phases_post_ocn",
                "MED med_phases_prep_atm",
                "MED med_phases_prep_ocn_accum",
                "MED med_phases_prep_ocn_avg",
                "MED -> ATM :remapMethod=redist",
                "MED -> OCN :remapMethod=redist",
                "ATM",
                "OCN",
            ]
        );
    }

    // The two-component branch has never written history or restart phases;
    // this pins that behavior.
    #[test]
    fn mediated_without_wave_omits_history_and_restart() {
        let lines = schedule(&[EntryType::Ocean], true).lines();

        assert!(!lines.iter().any(|l| l.ends_with(HISTORY_WRITE)));
        assert!(!lines.iter().any(|l| l.ends_with(RESTART_WRITE)));
        assert_eq!(lines[0], "OCN -> MED :remapMethod=redist");
    }

    #[test]
    fn remap_lines_carry_configured_method() {
        let mut run = schedule(&[EntryType::Ocean], true);
        run.method = RemapMethod::Bilinear;

        assert!(
            run.lines()
                .iter()
                .filter(|l| l.contains("->"))
                .all(|l| l.ends_with(":remapMethod=bilinear"))
        );
    }

    #[test]
    fn ice_joins_canonical_order() {
        let run = schedule(&[EntryType::Ice, EntryType::Atmospheric], true);
        let lines = run.lines();

        assert_eq!(lines[0], "ATM -> MED :remapMethod=redist");
        assert_eq!(lines[2], "ICE -> MED :remapMethod=redist");
        assert_eq!(lines[3], "MED med_phases_post_ice");
        assert!(lines.contains(&"MED med_phases_prep_ice".to_string()));
        assert_eq!(&lines[lines.len() - 2..], ["ATM", "ICE"]);
    }

    #[test]
    fn hydrology_is_exchanged_after_canonical_components() {
        let run = schedule(&[EntryType::Hydrological, EntryType::Ocean], true);

        assert_eq!(
            run.lines(),
            [
                "OCN -> MED :remapMethod=redist",
                "MED med_phases_post_ocn",
                "HYD -> MED :remapMethod=redist",
                "MED med_phases_post_hyd",
                "MED med_phases_prep_ocn_accum",
                "MED med_phases_prep_ocn_avg",
                "MED -> OCN :remapMethod=redist",
                "MED -> HYD :remapMethod=redist",
                "OCN",
                "HYD",
            ]
        );
    }

    #[test]
    fn hydrology_with_wave_gets_remaps_and_post_phase() {
        let run = schedule(&[EntryType::Hydrological, EntryType::Wave], true);
        let lines = run.lines();

        let inbound = position(&lines, "MED -> HYD :remapMethod=redist");
        let step = position(&lines, "HYD");
        let outbound = position(&lines, "HYD -> MED :remapMethod=redist");
        let post = position(&lines, "MED med_phases_post_hyd");

        assert!(position(&lines, "MED -> WAV :remapMethod=redist") < inbound);
        assert!(inbound < step && step < outbound && outbound < post);
        assert!(!lines.iter().any(|l| l.contains("prep_hyd")));
        assert_eq!(lines.last().unwrap(), "MED med_phases_restart_write");
    }

    #[test]
    fn from_sequence_reads_active_components() {
        use jiff::SignedDuration;

        use crate::configuration::MediatorOptions;
        use crate::model::ModelEntry;

        let mut sequence = RunSequence::new(SignedDuration::from_secs(1800));
        sequence.insert(ModelEntry::new(EntryType::Ocean, "schism", 64));
        sequence.insert(ModelEntry::new(EntryType::Atmospheric, "datm", 64));
        sequence
            .connect(EntryType::Ocean, EntryType::Mediator, None, MediatorOptions::default())
            .unwrap();

        let run = UfsRunSequence::from_sequence(&sequence, RemapMethod::default());
        assert_eq!(run.components, [EntryType::Ocean, EntryType::Atmospheric]);
        assert!(run.mediator);
        assert_eq!(run.interval_seconds, 1800);
    }
}
