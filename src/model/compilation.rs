//! The compilation arena and its hierarchy queries.
//!
//! Every query here is an explicit walk over parent pointers (base types,
//! overridden methods) bounded by the arena size, so malformed input can
//! never loop forever.

use std::collections::HashMap;

use super::{
    AttributeData, AttributeHit, AttributeOwner, AttributeRef, ConstValue, MethodId,
    MethodSymbol, ModelError, TypeExpr, TypeId, TypeKind, TypeNode,
};

/// Name of the built-in `void` type.
pub const VOID: &str = "void";

/// An in-memory type/symbol graph for one compilation.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub(crate) types: Vec<TypeNode>,
    pub(crate) methods: Vec<MethodSymbol>,
    by_name: HashMap<String, TypeId>,
    constructed: HashMap<(TypeId, Vec<TypeId>), TypeId>,
}

impl Default for Compilation {
    fn default() -> Self {
        Self::new()
    }
}

impl Compilation {
    /// Create an empty compilation containing only `void`.
    pub fn new() -> Self {
        let mut compilation = Self {
            types: Vec::new(),
            methods: Vec::new(),
            by_name: HashMap::new(),
            constructed: HashMap::new(),
        };
        compilation.types.push(TypeNode::declaration(VOID, TypeKind::Void, 0));
        compilation.by_name.insert(VOID.to_string(), TypeId::new(0));
        compilation
    }

    /// The built-in `void` type.
    pub fn void(&self) -> TypeId {
        TypeId::new(0)
    }

    /// Declare a new named type.
    pub fn declare_type(
        &mut self,
        name: &str,
        kind: TypeKind,
        arity: usize,
    ) -> Result<TypeId, ModelError> {
        if self.by_name.contains_key(name) {
            return Err(ModelError::DuplicateType(name.to_string()));
        }
        let id = TypeId::new(self.types.len());
        self.types.push(TypeNode::declaration(name, kind, arity));
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Add a method to its containing type.
    pub fn add_method(&mut self, method: MethodSymbol) -> MethodId {
        let id = MethodId::new(self.methods.len());
        let owner = method.containing_type;
        self.methods.push(method);
        self.types[owner.index()].methods.push(id);
        id
    }

    /// Mutable access to a declared type, for hosts building a graph by hand.
    pub fn type_mut(&mut self, id: TypeId) -> &mut TypeNode {
        &mut self.types[id.index()]
    }

    /// Instantiate a generic definition, interning the result.
    pub fn construct(&mut self, definition: TypeId, args: Vec<TypeId>) -> Result<TypeId, ModelError> {
        let def = &self.types[definition.index()];
        if def.arity != args.len() || def.is_constructed() {
            return Err(ModelError::ArityMismatch {
                name: def.name.clone(),
                expected: def.arity,
                found: args.len(),
            });
        }
        if let Some(id) = self.constructed.get(&(definition, args.clone())) {
            return Ok(*id);
        }

        let mut node = TypeNode::declaration(def.name.clone(), def.kind, 0);
        node.definition = Some(definition);
        node.type_args = args.clone();
        let id = TypeId::new(self.types.len());
        self.types.push(node);
        self.constructed.insert((definition, args), id);
        Ok(id)
    }

    /// Find an already constructed instantiation without creating one.
    pub fn constructed(&self, definition: TypeId, args: &[TypeId]) -> Option<TypeId> {
        self.constructed.get(&(definition, args.to_vec())).copied()
    }

    /// Resolve a parsed type expression against existing types only.
    pub fn resolve_expr(&self, expr: &TypeExpr) -> Option<TypeId> {
        let head = self.type_by_name(&expr.metadata_name())?;
        if expr.args.is_empty() {
            return Some(head);
        }
        let args = expr
            .args
            .iter()
            .map(|a| self.resolve_expr(a))
            .collect::<Option<Vec<_>>>()?;
        self.constructed(head, &args)
    }

    /// Look up a declared type by metadata name.
    pub fn type_by_name(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn node(&self, id: TypeId) -> &TypeNode {
        &self.types[id.index()]
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn kind(&self, id: TypeId) -> TypeKind {
        self.node(id).kind
    }

    /// Generic definition of a constructed type.
    pub fn definition_of(&self, id: TypeId) -> Option<TypeId> {
        self.node(id).definition
    }

    /// Type arguments of a constructed type (empty otherwise).
    pub fn type_arguments(&self, id: TypeId) -> &[TypeId] {
        &self.node(id).type_args
    }

    /// The declaration a type's members and attributes come from.
    fn origin(&self, id: TypeId) -> &TypeNode {
        let node = self.node(id);
        match node.definition {
            Some(def) => self.node(def),
            None => node,
        }
    }

    pub fn base_type(&self, id: TypeId) -> Option<TypeId> {
        self.origin(id).base
    }

    /// Interfaces declared directly on a type.
    pub fn interfaces(&self, id: TypeId) -> &[TypeId] {
        &self.origin(id).interfaces
    }

    /// Attributes declared directly on a type.
    pub fn attributes(&self, id: TypeId) -> &[AttributeData] {
        &self.origin(id).attributes
    }

    /// The type followed by its base types, most derived first.
    pub fn type_hierarchy(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(ty) = current {
            if chain.len() > self.types.len() || chain.contains(&ty) {
                break;
            }
            chain.push(ty);
            current = self.base_type(ty);
        }
        chain
    }

    /// Every interface implemented by a type or its bases, transitively.
    pub fn all_interfaces(&self, id: TypeId) -> Vec<TypeId> {
        let mut found: Vec<TypeId> = Vec::new();
        let mut pending: Vec<TypeId> = Vec::new();
        for ty in self.type_hierarchy(id) {
            pending.extend(self.interfaces(ty).iter().rev());
            while let Some(iface) = pending.pop() {
                if found.contains(&iface) {
                    continue;
                }
                found.push(iface);
                pending.extend(self.interfaces(iface).iter().rev());
            }
        }
        found
    }

    /// Whether a value of type `target` can be used where `source` is expected.
    pub fn is_assignable_from(&self, source: TypeId, target: TypeId) -> bool {
        if source == target {
            return true;
        }
        if self.kind(source) == TypeKind::Interface {
            return self.all_interfaces(target).contains(&source);
        }
        self.type_hierarchy(target).contains(&source)
    }

    /// Attributes on a type assignable to `attribute`, walking base types
    /// when `inherit` is set. Most derived declarations come first.
    pub fn attributes_of(&self, id: TypeId, attribute: TypeId, inherit: bool) -> Vec<AttributeHit<'_>> {
        let mut hits = Vec::new();
        for ty in self.type_hierarchy(id) {
            let owner = self.definition_of(ty).unwrap_or(ty);
            self.collect_hits(&mut hits, AttributeOwner::Type(owner), self.attributes(ty), attribute);
            if !inherit {
                break;
            }
        }
        hits
    }

    pub fn has_attribute(&self, id: TypeId, attribute: TypeId, inherit: bool) -> bool {
        !self.attributes_of(id, attribute, inherit).is_empty()
    }

    pub fn method(&self, id: MethodId) -> &MethodSymbol {
        &self.methods[id.index()]
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn method_ids(&self) -> impl Iterator<Item = MethodId> + '_ {
        (0..self.methods.len()).map(MethodId::new)
    }

    /// Methods declared directly on a type.
    pub fn methods_of(&self, id: TypeId) -> &[MethodId] {
        &self.origin(id).methods
    }

    /// The base-type method an override replaces: the first method with the
    /// same name found walking up from the containing type's base.
    pub fn overridden_method(&self, id: MethodId) -> Option<MethodId> {
        let method = self.method(id);
        if !method.is_override {
            return None;
        }
        let base = self.base_type(method.containing_type)?;
        self.type_hierarchy(base).into_iter().find_map(|ty| {
            self.methods_of(ty)
                .iter()
                .copied()
                .find(|m| self.method(*m).name == method.name)
        })
    }

    /// Attributes on a method assignable to `attribute`, following the
    /// override chain when `inherit` is set.
    pub fn method_attributes(&self, id: MethodId, attribute: TypeId, inherit: bool) -> Vec<AttributeHit<'_>> {
        let mut hits = Vec::new();
        let mut visited = 0;
        let mut current = Some(id);
        while let Some(m) = current {
            if visited > self.methods.len() {
                break;
            }
            visited += 1;
            self.collect_hits(&mut hits, AttributeOwner::Method(m), &self.method(m).attributes, attribute);
            if !inherit {
                break;
            }
            current = self.overridden_method(m);
        }
        hits
    }

    pub fn method_has_attribute(&self, id: MethodId, attribute: TypeId, inherit: bool) -> bool {
        !self.method_attributes(id, attribute, inherit).is_empty()
    }

    fn collect_hits<'a>(
        &self,
        hits: &mut Vec<AttributeHit<'a>>,
        owner: AttributeOwner,
        attributes: &'a [AttributeData],
        attribute: TypeId,
    ) {
        for (index, data) in attributes.iter().enumerate() {
            if self.is_assignable_from(attribute, data.class) {
                hits.push(AttributeHit {
                    source: AttributeRef { owner, index },
                    data,
                });
            }
        }
    }

    /// Resolve a constant member, searching the owner's base types.
    pub fn constant_value(&self, owner: TypeId, member: &str) -> Option<&ConstValue> {
        self.type_hierarchy(owner)
            .into_iter()
            .find_map(|ty| self.origin(ty).constants.get(member))
    }

    /// Human-readable name: `Task<ActionResult<Pet>>`.
    pub fn display_name(&self, id: TypeId) -> String {
        let node = self.node(id);
        let base_name = match node.name.find('`') {
            Some(tick) => &node.name[..tick],
            None => node.name.as_str(),
        };
        if node.type_args.is_empty() {
            return base_name.to_string();
        }
        let args: Vec<String> = node.type_args.iter().map(|a| self.display_name(*a)).collect();
        format!("{}<{}>", base_name, args.join(", "))
    }

    /// Qualified method name: `PetsController.GetPet`.
    pub fn method_display_name(&self, id: MethodId) -> String {
        let method = self.method(id);
        format!("{}.{}", self.display_name(method.containing_type), method.name)
    }
}
