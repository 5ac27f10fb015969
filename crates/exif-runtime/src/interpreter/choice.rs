use std::rc::Rc;

use exif_core::{DeferredTask, Interaction, PauseReason, Surface};
use tracing::debug;

use super::Interpreter;
use crate::instruction::OptionSpec;

impl Interpreter {
    /// Stages the eligible options, shows them inert and schedules the
    /// activating list, so nothing can be picked before the list is complete.
    pub(super) fn present_choice(&mut self, options: Vec<OptionSpec<'_>>) {
        self.pending_options.clear();
        for option in options {
            if !self.option_eligible(&option) {
                continue;
            }
            let element = Rc::clone(option.element);
            match self
                .pending_options
                .iter()
                .position(|(label, _)| label == option.label)
            {
                Some(index) => self.pending_options[index].1 = element,
                None => self
                    .pending_options
                    .push((option.label.to_string(), element)),
            }
        }

        let labels = self
            .pending_options
            .iter()
            .map(|(label, _)| label.clone())
            .collect::<Vec<_>>();
        debug!(options = labels.len(), "presenting choice");

        self.generation += 1;
        self.pause(PauseReason::Choice);
        let inert = Interaction::Options {
            labels: labels.clone(),
            active: false,
        };
        self.presenter.write(Surface::Interaction, &inert.render());

        let active = Interaction::Options {
            labels,
            active: true,
        };
        self.timer.schedule_delayed(
            DeferredTask {
                generation: self.generation,
                surface: Surface::Interaction,
                markup: active.render(),
            },
            self.choice_delay,
        );
    }

    /// Setting the trip flags is part of the check: an option whose trip adds
    /// no new flag is not offered.
    fn option_eligible(&mut self, option: &OptionSpec<'_>) -> bool {
        if option
            .if_set
            .is_some_and(|names| !self.flags.check_flags(names))
        {
            return false;
        }
        if option
            .if_clear
            .is_some_and(|names| !self.flags.check_clear(names))
        {
            return false;
        }
        match option.trip {
            Some(trip) => self.flags.check_clear(trip) && self.flags.set_flags(trip),
            None => true,
        }
    }
}
