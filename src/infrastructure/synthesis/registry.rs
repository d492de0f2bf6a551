//! Declaration registry shared by one synthesis run
//!
//! Declarations are stored in slots so a parent can claim its position
//! before its nested types are declared; the output then reads top-down.
//! Interfaces with an identical body are declared once and reused.

use std::collections::{HashMap, HashSet};

use crate::generation::emitter::{Emit, TsProp, TsType, TsTypeDef, TypeDefKind};

#[derive(Debug, Default)]
pub(crate) struct TypeRegistry {
    slots: Vec<Option<TsTypeDef>>,
    names: HashSet<String>,
    /// Interface body to the name it was first declared under
    shapes: HashMap<String, String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks root names as taken so nested types never use them.
    pub fn claim(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    /// Reserves an output position for a declaration.
    pub fn reserve(&mut self) -> usize {
        self.slots.push(None);
        self.slots.len() - 1
    }

    /// `base`, or `base2`, `base3`, ... when it is already taken.
    pub fn unique_name(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut counter = 2;
        while self.names.contains(&candidate) {
            candidate = format!("{base}{counter}");
            counter += 1;
        }
        self.names.insert(candidate.clone());
        candidate
    }

    /// Declares a nested interface, reusing an earlier one with the same body.
    ///
    /// Returns the name the interface is known by.
    pub fn declare_nested(&mut self, slot: usize, name: String, properties: Vec<TsProp>) -> String {
        let shape = shape_key(&properties);
        if let Some(existing) = self.shapes.get(&shape) {
            return existing.clone();
        }
        self.shapes.insert(shape, name.clone());
        self.fill(slot, name.clone(), TypeDefKind::Interface { properties });
        name
    }

    /// Declares a root interface under its exact name.
    ///
    /// A root whose body was already declared becomes an alias of it.
    pub fn declare_root(&mut self, slot: usize, name: &str, properties: Vec<TsProp>) {
        let shape = shape_key(&properties);
        match self.shapes.get(&shape) {
            Some(existing) if existing != name => {
                let ty = TsType::named(existing.as_str());
                self.fill(slot, name.to_string(), TypeDefKind::TypeAlias { ty });
            }
            _ => {
                self.shapes.insert(shape, name.to_string());
                self.fill(slot, name.to_string(), TypeDefKind::Interface { properties });
            }
        }
    }

    /// Declares `name` as an alias of `ty`.
    pub fn declare_alias(&mut self, slot: usize, name: &str, ty: TsType) {
        self.fill(slot, name.to_string(), TypeDefKind::TypeAlias { ty });
    }

    fn fill(&mut self, slot: usize, name: String, kind: TypeDefKind) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = Some(TsTypeDef { name, kind });
        }
    }

    /// All declarations in slot order, separated by blank lines.
    pub fn render(&self) -> String {
        self.slots
            .iter()
            .flatten()
            .map(Emit::emit)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn shape_key(properties: &[TsProp]) -> String {
    let bare: Vec<TsProp> = properties
        .iter()
        .map(|prop| TsProp {
            doc: None,
            ..prop.clone()
        })
        .collect();
    TsType::object(bare).emit()
}
