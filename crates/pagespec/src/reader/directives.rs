//! Line-level state machine of one spec file.
//!
//! Unindented lines switch state: object definition blocks (`===`),
//! directives (`@@`), section headers (`@`), parameterization (`[...]`) and
//! object names. Indented lines belong to whatever the last unindented line
//! opened: an object's specs or a `@@ set` block.

use super::grammar::{parse_spec, split_word};
use super::lines::Line;
use super::params;
use super::Compilation;
use crate::eval::Value;
use crate::locator::{Locator, LocatorKind};
use crate::model::{ConditionalBlock, ConditionalBlockStatement, ObjectSpecs, PageSection};
use crate::place::Place;
use crate::result::{SpecError, SpecResult};
use crate::spec::{Spec, SpecKind};

/// What indented lines currently attach to
#[derive(Debug)]
enum Pending {
    Nothing,
    Object {
        name: Line,
        indexes: Option<Vec<i64>>,
        specs: Vec<Line>,
    },
    Variables,
}

/// Branch of an open conditional block receiving object specs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Condition,
    Body,
    Otherwise,
}

#[derive(Debug)]
struct OpenBlock {
    block: ConditionalBlock,
    branch: Branch,
    place: Place,
}

pub(crate) struct FileReader<'c, 'r> {
    ctx: &'c mut Compilation<'r>,
    section: Option<usize>,
    pending: Pending,
    indexes: Option<(Vec<i64>, Place)>,
    block: Option<OpenBlock>,
    in_definitions: bool,
}

fn is_rule(text: &str, c: char) -> bool {
    text.len() >= 3 && text.chars().all(|ch| ch == c)
}

impl<'c, 'r> FileReader<'c, 'r> {
    pub(crate) fn new(ctx: &'c mut Compilation<'r>) -> Self {
        Self {
            ctx,
            section: None,
            pending: Pending::Nothing,
            indexes: None,
            block: None,
            in_definitions: false,
        }
    }

    pub(crate) fn run(mut self, lines: Vec<Line>) -> SpecResult<()> {
        for line in lines {
            self.feed(line)?;
        }
        self.flush()?;
        if let Some(open) = &self.block {
            return Err(SpecError::syntax(
                "Conditional block is not closed",
                &open.place,
            ));
        }
        if let Some((_, place)) = &self.indexes {
            return Err(SpecError::syntax(
                "Parameterization is not followed by an object",
                place,
            ));
        }
        Ok(())
    }

    fn feed(&mut self, line: Line) -> SpecResult<()> {
        if line.indented {
            return self.feed_indented(line);
        }
        self.flush()?;

        let text = line.text.as_str();
        if is_rule(text, '=') {
            self.in_definitions = !self.in_definitions;
            Ok(())
        } else if self.in_definitions {
            self.define_object(&line)
        } else if let Some(rest) = text.strip_prefix("@@") {
            let rest = self.ctx.substitute(rest, &line.place, None)?;
            self.directive(rest.trim(), &line.place)
        } else if let Some(rest) = text.strip_prefix('@') {
            let rest = self.ctx.substitute(rest, &line.place, None)?;
            self.section_header(rest.trim(), &line.place)
        } else if is_rule(text, '-') {
            Ok(())
        } else if text.starts_with('[') && text.ends_with(']') {
            let inner = self.ctx.substitute(text, &line.place, None)?;
            let inner = inner.trim_start_matches('[').trim_end_matches(']');
            let indexes = params::parse_indexes(inner, &line.place)?;
            self.indexes = Some((indexes, line.place));
            Ok(())
        } else {
            self.pending = Pending::Object {
                name: line,
                indexes: self.indexes.take().map(|(indexes, _)| indexes),
                specs: Vec::new(),
            };
            Ok(())
        }
    }

    fn feed_indented(&mut self, line: Line) -> SpecResult<()> {
        if let Pending::Object { specs, .. } = &mut self.pending {
            specs.push(line);
            return Ok(());
        }
        if matches!(self.pending, Pending::Variables) {
            let text = self.ctx.substitute(&line.text, &line.place, None)?;
            return self.set_variable(&text, &line.place);
        }
        if self.in_definitions {
            return self.define_object(&line);
        }
        let place = self
            .section
            .map_or(&line.place, |i| &self.ctx.spec.sections[i].place);
        Err(SpecError::syntax(
            "There is no object defined in section",
            place,
        ))
    }

    /// Close whatever the indented lines were attached to
    fn flush(&mut self) -> SpecResult<()> {
        match std::mem::replace(&mut self.pending, Pending::Nothing) {
            Pending::Object {
                name,
                indexes,
                specs,
            } => self.flush_object(&name, indexes, &specs),
            Pending::Nothing | Pending::Variables => Ok(()),
        }
    }

    fn flush_object(
        &mut self,
        name: &Line,
        indexes: Option<Vec<i64>>,
        specs: &[Line],
    ) -> SpecResult<()> {
        let objects = match indexes {
            None => vec![self.build_object(name, specs, None)?],
            Some(indexes) => {
                tracing::debug!(
                    object = %name.text,
                    count = indexes.len(),
                    "expanding parameterized block"
                );
                indexes
                    .into_iter()
                    .map(|index| self.build_object(name, specs, Some(index)))
                    .collect::<SpecResult<Vec<_>>>()?
            }
        };
        for object in objects {
            self.attach(object, &name.place);
        }
        Ok(())
    }

    fn build_object(
        &self,
        name: &Line,
        specs: &[Line],
        index: Option<i64>,
    ) -> SpecResult<ObjectSpecs> {
        let object_name = self.ctx.substitute(&name.text, &name.place, index)?;
        let specs = specs
            .iter()
            .map(|line| self.build_spec(line, index))
            .collect::<SpecResult<Vec<_>>>()?;
        Ok(ObjectSpecs::new(object_name.trim(), specs))
    }

    fn build_spec(&self, line: &Line, index: Option<i64>) -> SpecResult<Spec> {
        let text = self.ctx.substitute(&line.text, &line.place, index)?;
        let (only_warn, text) = match text.strip_prefix('%') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, text.as_str()),
        };
        let mut kind = parse_spec(text, &line.place, &self.ctx.reader.config)?;
        if let SpecKind::Component { path } = &mut kind {
            *path = self.ctx.imports.resolve(path).display().to_string();
        }
        Ok(Spec {
            kind,
            original_text: text.to_string(),
            place: line.place.clone(),
            only_warn,
        })
    }

    /// Route object specs into the open conditional branch or the section
    fn attach(&mut self, object: ObjectSpecs, place: &Place) {
        if let Some(open) = &mut self.block {
            match open.branch {
                Branch::Condition => {
                    if let Some(statement) = open.block.statements.last_mut() {
                        statement.objects.push(object);
                    }
                }
                Branch::Body => open.block.body_objects.push(object),
                Branch::Otherwise => open.block.otherwise_objects.push(object),
            }
            return;
        }
        let index = self.current_section(place);
        self.ctx.spec.sections[index].objects.push(object);
    }

    fn current_section(&mut self, place: &Place) -> usize {
        match self.section {
            Some(index) => index,
            None => {
                let index = self
                    .ctx
                    .push_section(PageSection::new("", Vec::new(), place.clone()));
                self.section = Some(index);
                index
            }
        }
    }

    fn define_object(&mut self, line: &Line) -> SpecResult<()> {
        let text = self.ctx.substitute(&line.text, &line.place, None)?;
        let (name, rest) = split_word(&text);
        let (kind, selector) = split_word(rest);
        if kind.is_empty() || selector.is_empty() {
            return Err(SpecError::syntax(
                format!("Missing locator for object \"{name}\""),
                &line.place,
            ));
        }
        let kind = LocatorKind::parse(kind).ok_or_else(|| {
            SpecError::syntax(format!("Unknown locator type: {kind}"), &line.place)
        })?;
        let locator = Locator::new(kind, selector);

        let Some(prefix) = name.strip_suffix('*') else {
            return self.ctx.declare_object(name, locator, &line.place);
        };
        let Some(page) = self.ctx.page else {
            tracing::debug!(group = name, "no page to count object group");
            return Ok(());
        };
        let count = page.count(&locator);
        tracing::debug!(group = name, count, "counted object group");
        for index in 1..=count {
            self.ctx.declare_object(
                &format!("{prefix}{index}"),
                locator.clone().with_index(index),
                &line.place,
            )?;
        }
        Ok(())
    }

    fn section_header(&mut self, text: &str, place: &Place) -> SpecResult<()> {
        if self.block.is_some() {
            return Err(SpecError::syntax(
                "Section cannot be declared inside a conditional block",
                place,
            ));
        }
        let (name, tags) = match text.split_once('|') {
            Some((name, tags)) => (name.trim(), tags),
            None => (text, text),
        };
        let tags = tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(ToString::to_string)
            .collect();
        let index = self
            .ctx
            .push_section(PageSection::new(name, tags, place.clone()));
        self.section = Some(index);
        Ok(())
    }

    fn directive(&mut self, text: &str, place: &Place) -> SpecResult<()> {
        let (name, arg) = split_word(text);
        match name {
            "import" => {
                if arg.is_empty() {
                    return Err(SpecError::syntax("Missing import path", place));
                }
                self.ctx.process_file(arg, Some(place))
            }
            "script" => {
                if arg.is_empty() {
                    return Err(SpecError::syntax("Missing script path", place));
                }
                self.ctx.load_script(arg, place)
            }
            "set" if arg.is_empty() => {
                self.pending = Pending::Variables;
                Ok(())
            }
            "set" => self.set_variable(arg, place),
            "if" => {
                if self.block.is_some() {
                    return Err(SpecError::syntax(
                        "Conditional blocks cannot be nested",
                        place,
                    ));
                }
                let inverted = inversion(name, arg, place)?;
                self.block = Some(OpenBlock {
                    block: ConditionalBlock {
                        statements: vec![ConditionalBlockStatement {
                            objects: Vec::new(),
                            inverted,
                        }],
                        ..ConditionalBlock::default()
                    },
                    branch: Branch::Condition,
                    place: place.clone(),
                });
                Ok(())
            }
            "or" => {
                let inverted = inversion(name, arg, place)?;
                let open = self.expect_branch(name, &[Branch::Condition], place)?;
                open.block.statements.push(ConditionalBlockStatement {
                    objects: Vec::new(),
                    inverted,
                });
                Ok(())
            }
            "do" => {
                self.expect_branch(name, &[Branch::Condition], place)?.branch = Branch::Body;
                Ok(())
            }
            "otherwise" => {
                self.expect_branch(name, &[Branch::Body], place)?.branch = Branch::Otherwise;
                Ok(())
            }
            "end" => {
                self.expect_branch(name, &[Branch::Body, Branch::Otherwise], place)?;
                if let Some(open) = self.block.take() {
                    let index = self.current_section(&open.place);
                    self.ctx.spec.sections[index]
                        .conditional_blocks
                        .push(open.block);
                }
                Ok(())
            }
            _ => Err(SpecError::syntax(format!("Unknown directive: {name}"), place)),
        }
    }

    fn expect_branch(
        &mut self,
        keyword: &str,
        allowed: &[Branch],
        place: &Place,
    ) -> SpecResult<&mut OpenBlock> {
        match &mut self.block {
            Some(open) if allowed.contains(&open.branch) => Ok(open),
            _ => Err(SpecError::syntax(
                format!("Unexpected \"{keyword}\" statement"),
                place,
            )),
        }
    }

    fn set_variable(&mut self, text: &str, place: &Place) -> SpecResult<()> {
        let (name, value) = split_word(text);
        if name.is_empty() {
            return Err(SpecError::syntax("Missing variable name", place));
        }
        tracing::trace!(name, value, "set variable");
        self.ctx
            .variables
            .insert(name.to_string(), Value::from_literal(value));
        Ok(())
    }
}

fn inversion(keyword: &str, arg: &str, place: &Place) -> SpecResult<bool> {
    match arg {
        "" => Ok(false),
        "not" => Ok(true),
        other => Err(SpecError::syntax(
            format!("Unexpected text after \"{keyword}\": {other}"),
            place,
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use crate::model::PageSpec;
    use crate::reader::PageSpecReader;
    use crate::result::SpecResult;
    use crate::spec::SpecKind;

    fn read(text: &str) -> SpecResult<PageSpec> {
        PageSpecReader::new().read_text(text, "d.spec", None)
    }

    mod structure_tests {
        use super::*;

        #[test]
        fn test_implicit_section() {
            let spec = read("menu\n    width: 10px\n    %height: 20px\n").unwrap();
            assert_eq!(spec.sections.len(), 1);
            assert_eq!(spec.sections[0].name, "");
            assert!(spec.sections[0].tags.is_empty());
            let specs = &spec.sections[0].objects[0].specs;
            assert!(!specs[0].only_warn);
            assert!(specs[1].only_warn);
            assert_eq!(specs[1].original_text, "height: 20px");
        }

        #[test]
        fn test_section_name_forms() {
            let spec = read(
                "@ Section 1 | all, mobile\nm\n    absent\n@ mobile,tablet,  desktop\nm\n    absent\n@ Named |\nm\n    absent\n@\nm\n    absent\n",
            )
            .unwrap();
            let s = &spec.sections;
            assert_eq!((s[0].name.as_str(), s[0].tags.clone()), ("Section 1", vec!["all".to_string(), "mobile".to_string()]));
            assert_eq!(s[1].name, "mobile,tablet,  desktop");
            assert_eq!(s[1].tags, vec!["mobile", "tablet", "desktop"]);
            assert_eq!(s[2].name, "Named");
            assert!(s[2].tags.is_empty());
            assert_eq!(s[3].name, "");
            assert!(s[3].tags.is_empty());
        }

        #[test]
        fn test_spec_without_object() {
            let err = read("@ Header\n------\n    width: 10px\n").unwrap_err();
            assert_eq!(err.message(), "There is no object defined in section");
            assert_eq!(err.line(), Some(1));
        }

        #[test]
        fn test_variables_inline_and_block() {
            let spec = read(
                "@@ set greeting Hi\n@@ set\n    name welcome\n    size 10\nmenu\n    text is: ${greeting}, ${name}\n    width: ${size * 2}px\n",
            )
            .unwrap();
            let specs = &spec.sections[0].objects[0].specs;
            assert_eq!(specs[0].original_text, "text is: Hi, welcome");
            assert_eq!(specs[1].original_text, "width: 20px");
        }

        #[test]
        fn test_unknown_directive() {
            let err = read("@@ include x.spec\n").unwrap_err();
            assert_eq!(err.message(), "Unknown directive: include");
        }
    }

    mod definition_tests {
        use super::*;

        #[test]
        fn test_missing_locator() {
            let err = read("===\nmenu\n===\n").unwrap_err();
            assert_eq!(err.message(), "Missing locator for object \"menu\"");
            assert_eq!(err.line(), Some(2));
        }

        #[test]
        fn test_unknown_locator_type() {
            let err = read("===\nmenu name menu\n===\n").unwrap_err();
            assert_eq!(err.message(), "Unknown locator type: name");
        }

        #[test]
        fn test_duplicate_object() {
            let err = read("===\nmenu id a\nmenu css .b\n===\n").unwrap_err();
            assert_eq!(err.message(), "Object \"menu\" is already defined");
            assert_eq!(err.line(), Some(3));
        }
    }

    mod parameterization_tests {
        use super::*;

        fn names(text: &str) -> Vec<String> {
            read(text)
                .unwrap()
                .sections
                .iter()
                .flat_map(|s| s.objects.iter().map(|o| o.object_name.clone()))
                .collect()
        }

        #[test]
        fn test_range_expansion() {
            assert_eq!(
                names("[1 - 3]\nbox-@-link\n    inside: box-@ 10px left\n"),
                vec!["box-1-link", "box-2-link", "box-3-link"]
            );
        }

        #[test]
        fn test_list_expansion() {
            let got = names("[1, 3, 6-8, 10]\nbox-@\n    absent\n");
            assert_eq!(got, vec!["box-1", "box-3", "box-6", "box-7", "box-8", "box-10"]);
        }

        #[test]
        fn test_reversed_range_drops_block() {
            let spec = read("@ s\n[1 to 0]\nbox-@\n    absent\n").unwrap();
            assert!(spec.sections.is_empty());
        }

        #[test]
        fn test_index_math_and_expression() {
            let spec = read("[1, 3]\nbox-@\n    inside: box-@{+1} ${index * 2 + 1}px left\n").unwrap();
            let objects = &spec.sections[0].objects;
            assert_eq!(objects[1].specs[0].original_text, "inside: box-4 7px left");
            assert!(matches!(
                &objects[0].specs[0].kind,
                SpecKind::Inside { object, .. } if object == "box-2"
            ));
        }

        #[test]
        fn test_huge_range_is_compile_error() {
            let err = read("[1 to 4000000000000000000]\nbox-@\n    absent\n").unwrap_err();
            assert!(err.message().starts_with("Incorrect parameter index: 1 to 4000000000000000000"));
            assert_eq!(err.line(), Some(1));
        }

        #[test]
        fn test_offset_overflow_is_compile_error() {
            let err = read("[1]\nbox-@{+9223372036854775807}\n    absent\n").unwrap_err();
            assert_eq!(
                err.message(),
                "Incorrect parameter index: @{+9223372036854775807}"
            );
            assert_eq!(err.line(), Some(2));

            let err = read("[1]\nbox-@\n    left of: box-@{+99999999999999999999}\n").unwrap_err();
            assert_eq!(err.line(), Some(3));
        }

        #[test]
        fn test_dangling_parameterization() {
            let err = read("[1 to 3]\n").unwrap_err();
            assert_eq!(err.message(), "Parameterization is not followed by an object");
        }
    }

    mod conditional_tests {
        use super::*;

        const BLOCK: &str = "@ s\n@@ if\nbutton-1\n    width: > 100px\n@@ or not\nbutton-2\n    width: 200px\n@@ do\nbutton-1\n    text is: sample text\n@@ otherwise\nbutton-2\n    text ends: something\n@@ end\n";

        #[test]
        fn test_block_structure() {
            let spec = read(BLOCK).unwrap();
            let block = &spec.sections[0].conditional_blocks[0];
            assert_eq!(block.statements.len(), 2);
            assert!(!block.statements[0].inverted);
            assert!(block.statements[1].inverted);
            assert_eq!(block.statements[1].objects[0].object_name, "button-2");
            assert_eq!(block.body_objects[0].specs[0].original_text, "text is: sample text");
            assert_eq!(block.otherwise_objects.len(), 1);
        }

        #[test]
        fn test_inverted_if() {
            let spec = read("@@ if not\nb\n    absent\n@@ do\nb\n    visible\n@@ end\n").unwrap();
            assert!(spec.sections[0].conditional_blocks[0].statements[0].inverted);
        }

        #[test]
        fn test_misplaced_keywords() {
            assert_eq!(
                read("@@ do\n").unwrap_err().message(),
                "Unexpected \"do\" statement"
            );
            assert_eq!(
                read("@@ if\nb\n    absent\n@@ otherwise\n").unwrap_err().message(),
                "Unexpected \"otherwise\" statement"
            );
            assert_eq!(
                read("@@ if\nb\n    absent\n@@ end\n").unwrap_err().message(),
                "Unexpected \"end\" statement"
            );
            assert_eq!(
                read("@@ if\nb\n    absent\n@@ do\n@@ or\n").unwrap_err().message(),
                "Unexpected \"or\" statement"
            );
        }

        #[test]
        fn test_nested_if() {
            let err = read("@@ if\n@@ if\n").unwrap_err();
            assert_eq!(err.message(), "Conditional blocks cannot be nested");
            assert_eq!(err.line(), Some(2));
        }

        #[test]
        fn test_section_inside_block() {
            let err = read("@@ if\nb\n    absent\n@ s\n").unwrap_err();
            assert_eq!(
                err.message(),
                "Section cannot be declared inside a conditional block"
            );
        }

        #[test]
        fn test_unclosed_block() {
            let err = read("@ s\n@@ if\nb\n    absent\n@@ do\n").unwrap_err();
            assert_eq!(err.message(), "Conditional block is not closed");
            assert_eq!(err.line(), Some(2));
        }
    }
}
