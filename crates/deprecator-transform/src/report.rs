//! Marking statistics per unit and per archive

use serde::Serialize;

/// Reporting bucket a declaration falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Type,
    Method,
    Field,
    EnumConstant,
}

/// Newly marked vs. already marked declarations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MarkCounts {
    pub marked: usize,
    pub already_marked: usize,
}

impl MarkCounts {
    #[inline]
    fn record(&mut self, marked: bool) {
        if marked {
            self.marked += 1;
        } else {
            self.already_marked += 1;
        }
    }

    #[inline]
    fn merge(&mut self, other: MarkCounts) {
        self.marked += other.marked;
        self.already_marked += other.already_marked;
    }
}

/// What happened to one code unit or source unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    pub types: MarkCounts,
    pub methods: MarkCounts,
    pub fields: MarkCounts,
    pub enum_constants: MarkCounts,
    /// Newly marked methods that override an inherited method
    pub overriding_methods: usize,
}

impl UnitReport {
    /// Record one evaluated declaration
    pub fn record(&mut self, category: Category, marked: bool) {
        let counts = match category {
            Category::Type => &mut self.types,
            Category::Method => &mut self.methods,
            Category::Field => &mut self.fields,
            Category::EnumConstant => &mut self.enum_constants,
        };
        counts.record(marked);
    }

    /// Declarations that received a marker
    #[must_use]
    pub fn newly_marked(&self) -> usize {
        self.types.marked + self.methods.marked + self.fields.marked + self.enum_constants.marked
    }

    /// Declarations skipped because they were already marked
    #[must_use]
    pub fn already_marked(&self) -> usize {
        self.types.already_marked
            + self.methods.already_marked
            + self.fields.already_marked
            + self.enum_constants.already_marked
    }

    /// Whether the unit's content changed
    #[inline]
    #[must_use]
    pub fn changed(&self) -> bool {
        self.newly_marked() > 0
    }

    fn merge(&mut self, other: &UnitReport) {
        self.types.merge(other.types);
        self.methods.merge(other.methods);
        self.fields.merge(other.fields);
        self.enum_constants.merge(other.enum_constants);
        self.overriding_methods += other.overriding_methods;
    }
}

/// Totals for one archive job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    /// Code or source units processed
    pub units: usize,
    /// Units whose content changed
    pub units_changed: usize,
    /// Entries passed through untouched
    pub resources: usize,
    /// Units left unmodified because they could not be processed safely
    pub units_skipped: usize,
    /// Declaration totals over all units
    pub declarations: UnitReport,
}

impl ArchiveReport {
    /// Fold one unit into the totals
    pub fn add_unit(&mut self, unit: &UnitReport) {
        self.units += 1;
        if unit.changed() {
            self.units_changed += 1;
        }
        self.declarations.merge(unit);
    }

    /// Count one pass-through entry
    #[inline]
    pub fn add_resource(&mut self) {
        self.resources += 1;
    }

    /// Count one unit copied verbatim
    #[inline]
    pub fn add_skipped_unit(&mut self) {
        self.units_skipped += 1;
    }
}
