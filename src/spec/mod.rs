//! Declared capability sets.
//!
//! A [`Spec`] describes the shape of a real dependency: whether it can be
//! called and which members it has. Mocks built with a spec reject access to
//! anything the spec does not declare.
//!
//! Class specs describe a type. Calling a class produces an instance, and
//! [`Spec::instance`] gives the spec of that instance. An instance is only
//! callable when the class says so with [`Spec::callable_instances`].
//!
//! ```rust
//! use testkit_double::spec::Spec;
//!
//! let x = Spec::class("X").method("run").attribute("name");
//! assert!(x.is_callable());
//! assert!(x.declares("run"));
//!
//! let instance = x.instance().unwrap();
//! assert!(!instance.is_callable());
//! assert!(instance.declares("name"));
//! ```

use std::collections::BTreeMap;

/// What a spec describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecKind {
    /// A type; calling it constructs an instance.
    Class,
    /// A value of some type.
    Instance,
    /// A free function.
    Function,
}

/// A declared member of a spec.
#[derive(Clone, Debug, PartialEq)]
pub enum Member {
    /// A callable member.
    Method,
    /// A plain, non-callable attribute.
    Attribute,
    /// A member with a shape of its own.
    Nested(Spec),
}

impl Member {
    /// Whether invoking the member is allowed.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        match self {
            Self::Method => true,
            Self::Attribute => false,
            Self::Nested(spec) => spec.is_callable(),
        }
    }
}

/// A declared capability set.
#[derive(Clone, Debug, PartialEq)]
pub struct Spec {
    name: String,
    kind: SpecKind,
    callable: bool,
    instance_callable: bool,
    members: BTreeMap<String, Member>,
}

impl Spec {
    /// Spec of a class. Classes are callable.
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SpecKind::Class,
            callable: true,
            instance_callable: false,
            members: BTreeMap::new(),
        }
    }

    /// Spec of a non-callable object.
    #[must_use]
    pub fn object(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SpecKind::Instance,
            callable: false,
            instance_callable: false,
            members: BTreeMap::new(),
        }
    }

    /// Spec of a function.
    #[must_use]
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SpecKind::Function,
            callable: true,
            instance_callable: false,
            members: BTreeMap::new(),
        }
    }

    /// Declare a callable member.
    #[must_use]
    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.members.insert(name.into(), Member::Method);
        self
    }

    /// Declare a non-callable member.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.members.insert(name.into(), Member::Attribute);
        self
    }

    /// Declare a member with its own spec.
    #[must_use]
    pub fn nested(mut self, name: impl Into<String>, spec: Spec) -> Self {
        self.members.insert(name.into(), Member::Nested(spec));
        self
    }

    /// Make instances of this class callable.
    ///
    /// Has no effect on object or function specs, which are not
    /// instantiated.
    #[must_use]
    pub fn callable_instances(mut self) -> Self {
        self.instance_callable = true;
        self
    }

    /// Make an object spec callable.
    #[must_use]
    pub fn callable(mut self, callable: bool) -> Self {
        if self.kind == SpecKind::Instance {
            self.callable = callable;
        }
        self
    }

    /// Inherit the members and instance callability of `base`.
    ///
    /// Members declared on `self` win over inherited ones, so calling this
    /// once per base class in order models multiple inheritance.
    #[must_use]
    pub fn extends(mut self, base: &Spec) -> Self {
        for (name, member) in &base.members {
            self.members
                .entry(name.clone())
                .or_insert_with(|| member.clone());
        }
        self.instance_callable |= base.instance_callable;
        self
    }

    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What the spec describes.
    #[must_use]
    pub fn kind(&self) -> SpecKind {
        self.kind
    }

    /// Whether the described value can be called.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        self.callable
    }

    /// Whether `name` is a declared member.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// The declaration of `name`, if any.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    /// Declared member names, sorted.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// Spec of the instances a class produces.
    ///
    /// Returns `None` for object and function specs.
    #[must_use]
    pub fn instance(&self) -> Option<Spec> {
        (self.kind == SpecKind::Class).then(|| Spec {
            name: self.name.clone(),
            kind: SpecKind::Instance,
            callable: self.instance_callable,
            instance_callable: false,
            members: self.members.clone(),
        })
    }
}
