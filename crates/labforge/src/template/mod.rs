//! Report template catalog.
//!
//! Templates are built once at startup into an immutable [`TemplateRegistry`]
//! that callers pass by reference into the resolver and renderers. Lookup by
//! unknown key deliberately falls back to the default template instead of
//! failing; callers can compare the returned template's `name` against the
//! requested key to detect the substitution.

use serde::{Deserialize, Serialize};

/// A named, titled block of a report template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Unique key used for content binding.
    pub name: String,
    /// Title rendered as the section heading.
    pub title: String,
    /// Required sections always render, at minimum as a placeholder.
    pub required: bool,
}

impl Section {
    /// A required section. Every built-in template section is required;
    /// optional sections are representable for caller-defined templates.
    fn new(name: &str, title: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            required: true,
        }
    }
}

/// An ordered list of sections for one report domain.
///
/// Section order is the definitive rendering order across all output formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTemplate {
    pub name: String,
    pub display_name: String,
    pub description: String,
    /// Section that receives the rendered statistics table.
    pub data_section: String,
    pub sections: Vec<Section>,
}

impl ReportTemplate {
    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }
}

/// Short description of a template for discovery listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub section_count: usize,
}

/// Immutable catalog of registered templates.
pub struct TemplateRegistry {
    templates: Vec<ReportTemplate>,
}

/// Template key used when a lookup misses.
pub const DEFAULT_TEMPLATE: &str = "physics_basic";

impl TemplateRegistry {
    /// Build the built-in catalog.
    pub fn new() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }

    /// Look up a template, falling back to [`DEFAULT_TEMPLATE`] on a miss.
    pub fn get(&self, key: &str) -> &ReportTemplate {
        self.templates
            .iter()
            .find(|t| t.name == key)
            .unwrap_or_else(|| {
                self.templates
                    .iter()
                    .find(|t| t.name == DEFAULT_TEMPLATE)
                    .expect("default template is always registered")
            })
    }

    /// Whether a key names a registered template.
    pub fn contains(&self, key: &str) -> bool {
        self.templates.iter().any(|t| t.name == key)
    }

    /// Summaries of every registered template, in registration order.
    pub fn list(&self) -> Vec<TemplateSummary> {
        self.templates
            .iter()
            .map(|t| TemplateSummary {
                name: t.name.clone(),
                display_name: t.display_name.clone(),
                description: t.description.clone(),
                section_count: t.sections.len(),
            })
            .collect()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_templates() -> Vec<ReportTemplate> {
    vec![
        ReportTemplate {
            name: "physics_basic".to_string(),
            display_name: "Physics Lab Report".to_string(),
            description: "For university physics experiments (mechanics, thermodynamics, optics)"
                .to_string(),
            data_section: "data_processing".to_string(),
            sections: vec![
                Section::new("experiment_purpose", "1. Objective"),
                Section::new("experiment_principle", "2. Principle"),
                Section::new("experiment_apparatus", "3. Apparatus"),
                Section::new("experiment_steps", "4. Procedure"),
                Section::new("data_processing", "5. Data Processing"),
                Section::new("error_analysis", "6. Error Analysis"),
                Section::new("conclusion", "7. Conclusion and Discussion"),
            ],
        },
        ReportTemplate {
            name: "chemistry_basic".to_string(),
            display_name: "Chemistry Lab Report".to_string(),
            description: "For inorganic, organic, and analytical chemistry experiments".to_string(),
            data_section: "data_observation".to_string(),
            sections: vec![
                Section::new("experiment_purpose", "1. Objective"),
                Section::new("experiment_principle", "2. Principle"),
                Section::new("experiment_reagents", "3. Reagents and Apparatus"),
                Section::new("experiment_steps", "4. Procedure"),
                Section::new("data_observation", "5. Data and Observations"),
                Section::new("calculation", "6. Calculations"),
                Section::new("error_analysis", "7. Error Analysis"),
                Section::new("conclusion", "8. Conclusion"),
            ],
        },
        ReportTemplate {
            name: "biology_basic".to_string(),
            display_name: "Biology Lab Report".to_string(),
            description: "For biology experiments (cell, biochemistry, molecular)".to_string(),
            data_section: "results".to_string(),
            sections: vec![
                Section::new("experiment_purpose", "1. Objective"),
                Section::new("background", "2. Background"),
                Section::new("materials", "3. Materials and Methods"),
                Section::new("results", "4. Results"),
                Section::new("analysis", "5. Analysis and Discussion"),
                Section::new("conclusion", "6. Conclusion"),
            ],
        },
        ReportTemplate {
            name: "cs_algorithm".to_string(),
            display_name: "Algorithm Experiment Report".to_string(),
            description: "For data structures, algorithm design, and machine learning experiments"
                .to_string(),
            data_section: "test_cases".to_string(),
            sections: vec![
                Section::new("problem_statement", "1. Problem Statement"),
                Section::new("algorithm_design", "2. Algorithm Design"),
                Section::new("complexity", "3. Complexity Analysis"),
                Section::new("implementation", "4. Implementation"),
                Section::new("test_cases", "5. Test Cases"),
                Section::new("results", "6. Results"),
                Section::new("discussion", "7. Discussion and Optimization"),
            ],
        },
        ReportTemplate {
            name: "engineering_basic".to_string(),
            display_name: "Engineering Lab Report".to_string(),
            description: "For circuits, materials, and engineering mechanics experiments"
                .to_string(),
            data_section: "data_analysis".to_string(),
            sections: vec![
                Section::new("experiment_objective", "1. Objective"),
                Section::new("theoretical_basis", "2. Theoretical Basis"),
                Section::new("equipment_specs", "3. Equipment"),
                Section::new("experimental_procedure", "4. Procedure"),
                Section::new("data_analysis", "5. Data Analysis"),
                Section::new("performance_eval", "6. Performance Evaluation"),
                Section::new("conclusion", "7. Conclusion"),
            ],
        },
    ]
}
