use std::rc::Rc;
use std::sync::OnceLock;

use exif_core::ExifError;
use exif_parser::ScriptElement;
use regex::{Captures, Regex};

/// A script element decoded into the transition it performs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Instruction<'a> {
    Block {
        if_set: Option<&'a str>,
        if_clear: Option<&'a str>,
        trip: Option<&'a str>,
    },
    Title,
    Description,
    Text {
        speaker: Option<String>,
    },
    ToDescription,
    ClearScreen,
    Pause,
    Choice {
        options: Vec<OptionSpec<'a>>,
    },
    Flag {
        set: Option<&'a str>,
        clear: Option<&'a str>,
    },
    Call {
        block: &'a str,
    },
    Goto {
        block: &'a str,
    },
    Load {
        file: &'a str,
        block: Option<&'a str>,
    },
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OptionSpec<'a> {
    pub(crate) label: &'a str,
    pub(crate) if_set: Option<&'a str>,
    pub(crate) if_clear: Option<&'a str>,
    pub(crate) trip: Option<&'a str>,
    pub(crate) element: &'a Rc<ScriptElement>,
}

impl<'a> Instruction<'a> {
    pub(crate) fn decode(element: &'a ScriptElement) -> Result<Self, ExifError> {
        let instruction = match element.name.as_str() {
            "block" => Self::Block {
                if_set: element.attr("if-set"),
                if_clear: element.attr("if-clear"),
                trip: element.attr("trip"),
            },
            "title" => Self::Title,
            "description" => Self::Description,
            "text" => Self::Text {
                speaker: element.attr("speaker").map(str::to_string),
            },
            "to-description" => Self::ToDescription,
            "clear-screen" => Self::ClearScreen,
            "pause" => Self::Pause,
            "choice" => Self::Choice {
                options: element
                    .children
                    .iter()
                    .filter(|child| child.name == "option")
                    .map(OptionSpec::decode)
                    .collect::<Result<Vec<_>, _>>()?,
            },
            "flag" => Self::Flag {
                set: element.attr("set"),
                clear: element.attr("clear"),
            },
            "call" => Self::Call {
                block: required(element, "block")?,
            },
            "goto" => Self::Goto {
                block: required(element, "block")?,
            },
            "load" => Self::Load {
                file: required(element, "file")?,
                block: element.attr("block"),
            },
            name if !name.starts_with(|ch: char| ch.is_ascii_lowercase()) => Self::Text {
                speaker: Some(speaker_label(name)),
            },
            _ => Self::Ignored,
        };
        Ok(instruction)
    }
}

impl<'a> OptionSpec<'a> {
    fn decode(element: &'a Rc<ScriptElement>) -> Result<Self, ExifError> {
        Ok(Self {
            label: required(element, "of")?,
            if_set: element.attr("if-set"),
            if_clear: element.attr("if-clear"),
            trip: element.attr("trip"),
            element,
        })
    }
}

fn required<'a>(element: &'a ScriptElement, attribute: &str) -> Result<&'a str, ExifError> {
    element.attr(attribute).ok_or_else(|| {
        ExifError::missing_attribute(&element.name, attribute, element.location.clone())
    })
}

/// Turns a speaker tag name into a label: `FooBar` becomes `Foo Bar`.
pub fn speaker_label(tag_name: &str) -> String {
    static CAPITAL: OnceLock<Regex> = OnceLock::new();
    let regex = CAPITAL.get_or_init(|| Regex::new(r"\p{Lu}").expect("capital regex must compile"));
    regex
        .replace_all(tag_name, |caps: &Captures| {
            let capital = &caps[0];
            if caps.get(0).is_some_and(|m| m.start() == 0) {
                capital.to_string()
            } else {
                format!(" {}", capital)
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use exif_parser::parse_script_document;

    fn element(source: &str) -> Rc<ScriptElement> {
        parse_script_document(source).expect("xml should parse").root
    }

    #[test]
    fn speaker_label_splits_interior_capitals() {
        assert_eq!(speaker_label("FooBar"), "Foo Bar");
        assert_eq!(speaker_label("OldManJenkins"), "Old Man Jenkins");
        assert_eq!(speaker_label("ABC"), "A B C");
        assert_eq!(speaker_label("Narrator"), "Narrator");
    }

    #[test]
    fn decode_recognizes_tags_and_optional_attributes() {
        let block = element(r#"<block if-set="a b" trip="seen"/>"#);
        assert_eq!(
            Instruction::decode(&block).expect("decode"),
            Instruction::Block {
                if_set: Some("a b"),
                if_clear: None,
                trip: Some("seen"),
            }
        );

        let load = element(r#"<load file="cave.xml"/>"#);
        assert_eq!(
            Instruction::decode(&load).expect("decode"),
            Instruction::Load {
                file: "cave.xml",
                block: None,
            }
        );

        let unknown = element("<sound src=\"x\"/>");
        assert_eq!(Instruction::decode(&unknown).expect("decode"), Instruction::Ignored);
    }

    #[test]
    fn non_lowercase_tag_becomes_spoken_text() {
        let spoken = element("<InnKeeper>Welcome.</InnKeeper>");
        assert_eq!(
            Instruction::decode(&spoken).expect("decode"),
            Instruction::Text {
                speaker: Some("Inn Keeper".to_string()),
            }
        );
        let underscored = element("<_aside>psst</_aside>");
        assert!(matches!(
            Instruction::decode(&underscored).expect("decode"),
            Instruction::Text { .. }
        ));
    }

    #[test]
    fn missing_required_attribute_fails() {
        let call = element("<call/>");
        let error = Instruction::decode(&call).expect_err("call needs block");
        assert_eq!(error.code, "ENGINE_MISSING_ATTRIBUTE");

        let choice = element(r#"<choice><option of="Yes"/><option/></choice>"#);
        let error = Instruction::decode(&choice).expect_err("option needs of");
        assert_eq!(error.message, "<option> tag must have 'of' attribute.");
    }

    #[test]
    fn choice_decodes_only_option_children() {
        let choice = element(r#"<choice><option of="Left" if-clear="hurt"/><note/><option of="Right"/></choice>"#);
        let Instruction::Choice { options } = Instruction::decode(&choice).expect("decode") else {
            panic!("expected choice");
        };
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "Left");
        assert_eq!(options[0].if_clear, Some("hurt"));
        assert_eq!(options[1].label, "Right");
    }
}
