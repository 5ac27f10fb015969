use std::rc::Rc;

use exif_core::{ExifError, FrameKind, Interaction, PauseReason, Surface};
use exif_parser::ScriptElement;
use tracing::{debug, trace};

use super::{Interpreter, SPEAKER_PLACEHOLDER};
use crate::instruction::Instruction;

impl Interpreter {
    pub(super) fn execute(&mut self, element: &Rc<ScriptElement>) -> Result<(), ExifError> {
        trace!(tag = %element.name, depth = self.stack.depth(), "execute");
        match Instruction::decode(element)? {
            Instruction::Block {
                if_set,
                if_clear,
                trip,
            } => {
                if if_set.is_some_and(|names| !self.flags.check_flags(names)) {
                    return Ok(());
                }
                if if_clear.is_some_and(|names| !self.flags.check_clear(names)) {
                    return Ok(());
                }
                if let Some(trip) = trip {
                    if self.flags.check_flags(trip) {
                        return Ok(());
                    }
                    self.flags.set_flags(trip);
                }
                self.stack.push(Rc::clone(element), FrameKind::Standard);
            }
            Instruction::Title => self.presenter.write(Surface::Title, &element.inner_markup),
            Instruction::Description => self
                .presenter
                .write(Surface::Description, &element.inner_markup),
            Instruction::Text { speaker } => self.show_text(element, speaker.as_deref()),
            Instruction::ToDescription => {
                self.stack.push(Rc::clone(element), FrameKind::ToDescription);
            }
            Instruction::ClearScreen => {
                for surface in Surface::ALL {
                    self.presenter.write(surface, "");
                }
            }
            Instruction::Pause => self.pause(PauseReason::Continue),
            Instruction::Choice { options } => self.present_choice(options),
            Instruction::Flag { set, clear } => {
                if let Some(names) = set {
                    self.flags.set_flags(names);
                }
                if let Some(names) = clear {
                    self.flags.clear_flags(names);
                }
            }
            Instruction::Call { block } => self.call(block)?,
            Instruction::Goto { block } => {
                debug!(block, "goto clears the call stack");
                self.stack.clear();
                self.call(block)?;
            }
            Instruction::Load { file, block } => self.load(file, block)?,
            Instruction::Ignored => {}
        }
        Ok(())
    }

    fn show_text(&mut self, element: &ScriptElement, speaker: Option<&str>) {
        self.presenter
            .write(Surface::Speaker, speaker.unwrap_or(SPEAKER_PLACEHOLDER));

        let text = element.inner_markup.trim();
        match speaker {
            Some(_) => self
                .presenter
                .write(Surface::Default, &format!("\"{}\"", text)),
            None => self.presenter.write(Surface::Default, text),
        }

        if self.stack.contains_kind(FrameKind::ToDescription) {
            self.pending_append = Some(text.to_string());
        }

        let next_is_choice = self.stack.lookahead().map(|next| next.name == "choice");
        match next_is_choice {
            None => self
                .presenter
                .write(Surface::Interaction, &Interaction::End.render()),
            Some(false) => self.pause(PauseReason::Continue),
            Some(true) => {}
        }
    }
}
