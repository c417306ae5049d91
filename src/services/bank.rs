// src/services/bank.rs

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::exam::{ExamParameters, Question, QuestionType};

/// The deterministic local question source, used when the remote call fails
/// and as the offline default.
///
/// The content is a data table, not code: the built-in subjects can be
/// replaced wholesale by pointing `QUESTION_BANK_PATH` at a JSON file with
/// the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    /// Question texts keyed by lower-cased subject name.
    pub subjects: HashMap<String, Vec<String>>,

    /// Option sets cycled across choice questions.
    pub option_sets: Vec<Vec<String>>,
}

impl QuestionBank {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let raw = std::fs::read_to_string(path)?;
        let bank: Self = serde_json::from_str(&raw).map_err(std::io::Error::other)?;
        bank.check_tables().map_err(std::io::Error::other)?;
        Ok(bank)
    }

    /// `synthesize` indexes modulo the table lengths, so an injected bank
    /// must not carry empty tables.
    fn check_tables(&self) -> Result<(), String> {
        if self.option_sets.is_empty() {
            return Err("option_sets must not be empty".to_string());
        }
        if let Some(i) = self.option_sets.iter().position(|set| set.is_empty()) {
            return Err(format!("option_sets[{}] has no options", i));
        }
        if let Some((name, _)) = self.subjects.iter().find(|(_, qs)| qs.is_empty()) {
            return Err(format!("subject \"{}\" has no questions", name));
        }
        Ok(())
    }

    /// Deterministically synthesizes exactly `question_count` questions by
    /// cycling through the per-subject table (or a generic topic/subject
    /// template for unrecognized subjects), the option sets, and a
    /// round-robin answer assignment.
    pub fn synthesize(&self, params: &ExamParameters) -> Vec<Question> {
        let subject_key = params.subject.to_lowercase();
        let bank = self.subjects.get(&subject_key);

        (0..params.question_count as usize)
            .map(|i| {
                let question_text = match bank {
                    Some(questions) => questions[i % questions.len()].clone(),
                    None => generic_question(&params.subject, &params.topic, i),
                };

                let (options, correct_answer) = self.answer_for(params.question_type, i);

                Question {
                    id: format!("q-{}", i + 1),
                    question_text,
                    options,
                    correct_answer,
                    explanation: format!(
                        "This explanation discusses the concept of {} in {}. The correct \
                         answer demonstrates understanding of the key principles involved.",
                        params.topic, params.subject
                    ),
                }
            })
            .collect()
    }

    fn answer_for(
        &self,
        question_type: QuestionType,
        index: usize,
    ) -> (Option<Vec<String>>, String) {
        match question_type {
            QuestionType::MultipleChoice | QuestionType::Mixed => {
                let options = self.option_sets[index % self.option_sets.len()].clone();
                let letter = (b'A' + (index % options.len().min(4)) as u8) as char;
                (Some(options), format!("Option {}", letter))
            }
            QuestionType::TrueFalse => {
                let answer = if index % 2 == 0 { "True" } else { "False" };
                (
                    Some(vec!["True".to_string(), "False".to_string()]),
                    answer.to_string(),
                )
            }
            QuestionType::ShortAnswer | QuestionType::Essay => (
                None,
                "This is a sample reference answer for the question.".to_string(),
            ),
        }
    }
}

fn generic_question(subject: &str, topic: &str, index: usize) -> String {
    let templates = [
        format!(
            "Question {} about {} in the field of {}",
            index + 1,
            topic,
            subject
        ),
        format!(
            "Explain the key concepts of {} as it relates to {}",
            topic, subject
        ),
        format!(
            "How would you apply {} principles to solve problems in {}?",
            topic, subject
        ),
    ];
    templates[index % templates.len()].clone()
}

impl Default for QuestionBank {
    fn default() -> Self {
        let mut subjects = HashMap::new();

        subjects.insert(
            "mathematics".to_string(),
            vec![
                "Calculate the derivative of f(x) = 3x² + 2x - 5".to_string(),
                "Solve the equation 2x² - 7x + 3 = 0".to_string(),
                "Find the integral of g(x) = 4x³ - 2x² + 3x - 1".to_string(),
                "If sin(θ) = 0.6, what is cos(θ)?".to_string(),
                "What is the limit of (1 + 1/n)^n as n approaches infinity?".to_string(),
                "Find the volume of a sphere with radius 5 units".to_string(),
                "If A = [1 2; 3 4], find the determinant of A".to_string(),
                "Solve the system of equations: 3x + 2y = 14, 5x - 3y = 7".to_string(),
                "Find the domain of the function f(x) = ln(x² - 3)".to_string(),
                "Calculate the area under the curve y = x² from x = 0 to x = 3".to_string(),
            ],
        );

        subjects.insert(
            "physics".to_string(),
            vec![
                "Calculate the force required to accelerate a 2 kg object at 5 m/s²".to_string(),
                "A car travels at 20 m/s for 10 seconds. How far does it travel?".to_string(),
                "Calculate the wavelength of a photon with energy 3.0 eV".to_string(),
                "What is the electric field at a distance of 2m from a point charge of 4C?"
                    .to_string(),
                "A spring has a spring constant of 200 N/m. How much energy is stored when it \
                 is compressed by 10 cm?"
                    .to_string(),
                "Calculate the momentum of a 5 kg object moving at 10 m/s".to_string(),
                "What is the period of a pendulum with length 2m on Earth?".to_string(),
                "Calculate the centripetal acceleration of an object moving in a circle of \
                 radius 3m at 5 m/s"
                    .to_string(),
                "Two charges of +2C and -3C are separated by 4m. Calculate the electric \
                 potential at the midpoint"
                    .to_string(),
                "What is the magnetic field at the center of a current-carrying loop with \
                 radius 5cm and current 2A?"
                    .to_string(),
            ],
        );

        subjects.insert(
            "chemistry".to_string(),
            vec![
                "Balance the following chemical equation: H₂ + O₂ → H₂O".to_string(),
                "Calculate the pH of a solution with [H⁺] = 1.0 × 10⁻⁵ M".to_string(),
                "What is the molar mass of sulfuric acid (H₂SO₄)?".to_string(),
                "Calculate the number of moles in a 25g sample of CaCO₃".to_string(),
                "Define Hess's Law and explain its significance in thermochemistry".to_string(),
                "What is the hybridization of the carbon atom in ethene (C₂H₄)?".to_string(),
                "Calculate the boiling point elevation for a solution with 10g of glucose in \
                 100g of water"
                    .to_string(),
                "Explain the difference between SN1 and SN2 reactions".to_string(),
                "What is the oxidation state of chromium in K₂Cr₂O₇?".to_string(),
                "Calculate the mass of sodium hydroxide needed to prepare 250mL of a 0.1M \
                 solution"
                    .to_string(),
            ],
        );

        subjects.insert(
            "biology".to_string(),
            vec![
                "Describe the structure and function of mitochondria".to_string(),
                "Explain the role of enzymes in metabolic reactions".to_string(),
                "Describe the stages of mitosis in eukaryotic cells".to_string(),
                "Explain how DNA replication occurs in eukaryotic cells".to_string(),
                "Describe the structure and function of cell membranes".to_string(),
                "Explain the process of protein synthesis".to_string(),
                "Describe the circulatory system in mammals".to_string(),
                "What are the main differences between prokaryotic and eukaryotic cells?"
                    .to_string(),
                "Explain the process of cellular respiration".to_string(),
                "Describe the structure and function of nephrons in the kidney".to_string(),
            ],
        );

        let option_sets = vec![
            vec![
                "3x² + 2".to_string(),
                "6x + 2".to_string(),
                "6x - 5".to_string(),
                "3x² + 2x".to_string(),
            ],
            vec![
                "x = 3 and x = 0.5".to_string(),
                "x = 3.5 and x = 0.5".to_string(),
                "x = 3 and x = -0.5".to_string(),
                "x = 3.5 and x = -0.5".to_string(),
            ],
            vec![
                "10 N".to_string(),
                "20 N".to_string(),
                "5 N".to_string(),
                "15 N".to_string(),
            ],
            vec![
                "200 m".to_string(),
                "100 m".to_string(),
                "150 m".to_string(),
                "250 m".to_string(),
            ],
            vec![
                "Bohr model".to_string(),
                "Rutherford model".to_string(),
                "Quantum model".to_string(),
                "Thomson model".to_string(),
            ],
            vec![
                "1.8 × 10⁻¹⁴".to_string(),
                "6.02 × 10²³".to_string(),
                "9.11 × 10⁻³¹".to_string(),
                "1.67 × 10⁻²⁷".to_string(),
            ],
            vec![
                "Mitochondria".to_string(),
                "Nucleus".to_string(),
                "Golgi apparatus".to_string(),
                "Endoplasmic reticulum".to_string(),
            ],
            vec![
                "Anaphase".to_string(),
                "Prophase".to_string(),
                "Metaphase".to_string(),
                "Telophase".to_string(),
            ],
        ];

        Self {
            subjects,
            option_sets,
        }
    }
}
