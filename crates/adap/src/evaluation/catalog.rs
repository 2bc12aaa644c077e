//! Reference categories and questions of the evaluation instrument.
//!
//! The catalog is loaded once and never mutated; question codes are unique and are the
//! join key between stored responses and the scoring weight tables.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::domain::{Category, CategoryId, Question, QuestionId};
use super::scoring::WeightTable;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("question code {0} appears more than once")]
    DuplicateCode(String),
    #[error("category {category} contains a question without a code")]
    EmptyCode { category: String },
}

/// Bulk-load input for one category and its questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    pub group: String,
    pub questions: Vec<QuestionSeed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSeed {
    pub text: String,
    pub code: String,
}

/// Immutable, indexed set of categories and questions.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
    questions: Vec<Question>,
    by_id: HashMap<QuestionId, usize>,
    by_code: HashMap<String, usize>,
}

impl Catalog {
    /// Ids are assigned sequentially from 1 in seed order.
    pub fn from_seed(seed: Vec<CategorySeed>) -> Result<Self, CatalogError> {
        let mut codes = HashSet::new();
        for category in &seed {
            for question in &category.questions {
                let code = question.code.trim();
                if code.is_empty() {
                    return Err(CatalogError::EmptyCode {
                        category: category.name.clone(),
                    });
                }
                if !codes.insert(code) {
                    return Err(CatalogError::DuplicateCode(code.to_string()));
                }
            }
        }
        Ok(Self::index(seed))
    }

    /// The published instrument: performance, organizational support, then self-leadership.
    pub fn standard() -> Self {
        Self::index(standard_seed())
    }

    fn index(seed: Vec<CategorySeed>) -> Self {
        let mut categories = Vec::with_capacity(seed.len());
        let mut questions = Vec::new();
        let mut by_id = HashMap::new();
        let mut by_code = HashMap::new();

        for (category_index, category) in seed.into_iter().enumerate() {
            let category_id = CategoryId(category_index as i64 + 1);
            for question in category.questions {
                let index = questions.len();
                let id = QuestionId(index as i64 + 1);
                let code = question.code.trim().to_string();
                by_id.insert(id, index);
                by_code.entry(code.clone()).or_insert(index);
                questions.push(Question {
                    id,
                    text: question.text,
                    code,
                    category_id,
                });
            }
            categories.push(Category {
                id: category_id,
                name: category.name,
                group: category.group,
            });
        }

        Self {
            categories,
            questions,
            by_id,
            by_code,
        }
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.by_id.get(&id).map(|index| &self.questions[*index])
    }

    pub fn question_by_code(&self, code: &str) -> Option<&Question> {
        self.by_code.get(code).map(|index| &self.questions[*index])
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Questions of one category in seed order.
    pub fn questions_in(&self, category: CategoryId) -> impl Iterator<Item = &Question> + '_ {
        self.questions
            .iter()
            .filter(move |question| question.category_id == category)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Weight-table codes with no backing question.
    pub fn missing_codes(&self, table: &WeightTable) -> Vec<&'static str> {
        table
            .codes()
            .filter(|code| !self.by_code.contains_key(*code))
            .collect()
    }
}

fn category(name: &str, group: &str, questions: &[(&str, &str)]) -> CategorySeed {
    CategorySeed {
        name: name.to_string(),
        group: group.to_string(),
        questions: questions
            .iter()
            .map(|(text, code)| QuestionSeed {
                text: text.to_string(),
                code: code.to_string(),
            })
            .collect(),
    }
}

pub fn standard_seed() -> Vec<CategorySeed> {
    vec![
        category(
            "Desempeño de Tarea",
            "D1",
            &[
                ("Me las arreglé para planificar mi trabajo para que se hiciera a tiempo.", "Des_1"),
                ("Mi planeación fue óptima.", "Des_2"),
                ("Tuve la oportunidad de priorizar los problemas principales de los secundarios.", "Des_3"),
                ("Pude realizar bien mi trabajo con un mínimo tiempo y esfuerzo.", "Des_4"),
            ],
        ),
        category(
            "Desempeño Contextual",
            "D2",
            &[
                ("Asumí responsabilidades adicionales.", "Des_5"),
                ("Yo mismo comencé nuevas tareas cuando terminé las anteriores.", "Des_6"),
                ("Asumí una tarea de trabajo desafiante cuando estaba disponible.", "Des_7"),
                ("Trabajé para mantener actualizado mi conocimiento laboral.", "Des_8"),
                ("Trabajé para mantener mis actividades laborales actualizadas.", "Des_9"),
                ("Me ocurrieron soluciones creativas para nuevos problemas.", "Des_10"),
                ("Seguí buscando nuevos retos para mi trabajo.", "Des_11"),
                ("Participé activamente en reuniones de trabajo.", "Des_12"),
            ],
        ),
        category(
            "Desempeño Contraproducente",
            "D3",
            &[
                ("Me quejé de asuntos sin importancia en el trabajo.", "Des_13"),
                ("Hice los problemas más grandes de lo que estaban.", "Des_14"),
                ("Me concentré en los aspectos negativos de una situación laboral, en lugar de los aspectos positivos.", "Des_15"),
                ("Hablé con colegas sobre los aspectos negativos de mi trabajo.", "Des_16"),
                ("Hablé con personas ajenas a la organización sobre los aspectos negativos de mi trabajo.", "Des_17"),
            ],
        ),
        category(
            "Apoyo Organizacional",
            "A1",
            &[
                ("La organización tiene en cuenta mis objetivos y valores.", "Apoyo_1"),
                ("Tengo ayuda completa de la organización cuando se presenta algún problema.", "Apoyo_2"),
                ("La organización está dispuesta a darme soporte para realizar mejor mi trabajo.", "Apoyo_3"),
                ("La organización intenta que mi trabajo sea lo más interesante posible.", "Apoyo_4"),
                ("La organización tiene en cuenta mis opiniones.", "Apoyo_5"),
                ("Si la organización obtuviera mayores ganancias consideraría aumentar mi salario.", "Apoyo_6"),
            ],
        ),
        category(
            "Estrategias de Comportamiento",
            "E1",
            &[
                ("Escribo metas específicas para mi propio desempeño.", "Auto_10"),
                ("Establezco metas específicas para mi propio desempeño.", "Auto_6"),
                ("Pienso en las metas que pretendo alcanzar en el futuro.", "Auto_5"),
                ("Trabajo hacia metas específicas que me he fijado.", "Auto_3"),
                ("Cuando he completado con éxito una tarea, a menudo me recompenso con algo que me gusta.", "Auto_14"),
                ("Tiendo a ser duro conmigo mismo en mi forma de pensar cuando no he hecho bien una tarea.", "Auto_7"),
                ("Me aseguro de hacer un seguimiento de lo bien que me está yendo en el trabajo/estudio.", "Auto_4"),
                ("Utilizo notas escritas para recordarme a mí mismo lo que necesito lograr.", "Auto_8"),
                ("Utilizo recordatorios concretos (Ej., Notas y listas) para ayudarme a concentrarme en las cosas que quiero lograr.", "Auto_13"),
            ],
        ),
        category(
            "Estrategias de Recompensa",
            "E2",
            &[
                ("Intento rodearme de los objetos y las personas que resaltan mis comportamientos deseables.", "Auto_15"),
                ("Cuando tengo una opción, trato de hacer mi trabajo de la manera que disfruto, en lugar de tratar simplemente de superarlo.", "Auto_16"),
                ("Busco actividades en mi trabajo que disfruto hacer.", "Auto_17"),
            ],
        ),
        category(
            "Estrategias de Pensamiento Constructivo",
            "E3",
            &[
                ("Me visualizo realizando una tarea con éxito antes de realizarla.", "Auto_1"),
                ("Me visualizo a propósito, superando los desafíos que enfrento.", "Auto_2"),
                ("Pienso en mis propias creencias y suposiciones cada vez que encuentro una situación difícil.", "Auto_9"),
                ("Cuando me encuentro en situaciones difíciles, a veces hablo conmigo mismo (en voz alta o mentalmente) para ayudarme a superarlo.", "Auto_11"),
                ("Expreso y evalúo abiertamente mis propias suposiciones.", "Auto_12"),
                ("Pienso y evalúo las creencias y suposiciones que tengo.", "Auto_18"),
                ("Pienso en mis propias creencias y suposiciones cada vez que encuentro una situación difícil.", "Auto_19"),
            ],
        ),
    ]
}
