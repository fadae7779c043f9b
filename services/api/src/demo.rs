use dept_review::dataset::{DatasetImportError, ExpertAssignment, PortalDataset};
use dept_review::ranking::{
    AcademicYear, Category, Department, DepartmentCode, DepartmentId, ExpertId, ExpertReview,
    SectionKind, SectionRow,
};

/// Department, category and the five section subtotals it reports.
const DEMO_DEPARTMENTS: &[(i64, &str, &str, Category, [f64; 5])] = &[
    (1, "CHEM", "Chemistry", Category::Sciences, [88.0, 132.0, 120.0, 118.0, 140.0]),
    (2, "PHY", "Physics", Category::Sciences, [92.0, 141.0, 126.0, 101.0, 122.0]),
    (3, "ZOO", "Zoology", Category::Sciences, [70.0, 98.0, 110.0, 96.0, 104.0]),
    (
        4,
        "CIV",
        "Civil Engineering",
        Category::EngineeringAndTechnology,
        [81.0, 110.0, 128.0, 135.0, 150.0],
    ),
    (
        5,
        "CSE",
        "Computer Science & Engineering",
        Category::EngineeringAndTechnology,
        [95.0, 138.0, 131.0, 147.0, 160.0],
    ),
    (6, "ENG", "English", Category::Humanities, [77.0, 90.0, 104.0, 88.0, 112.0]),
    (7, "HIST", "History", Category::Humanities, [77.0, 90.0, 104.0, 88.0, 112.0]),
    (8, "ECO", "Economics", Category::SocialSciences, [85.0, 121.0, 117.0, 109.0, 98.0]),
    (9, "POL", "Political Science", Category::SocialSciences, [64.0, 87.0, 92.0, 80.0, 91.0]),
    (10, "COM", "Commerce", Category::CommerceAndManagement, [79.0, 76.0, 101.0, 139.0, 120.0]),
    (
        11,
        "MBA",
        "Management Studies",
        Category::CommerceAndManagement,
        [90.0, 99.0, 115.0, 142.0, 133.0],
    ),
    (12, "LAW", "Law", Category::ProfessionalStudies, [83.0, 94.0, 108.0, 126.0, 171.0]),
    (13, "EDU", "Education", Category::ProfessionalStudies, [72.0, 68.0, 97.0, 111.0, 119.0]),
];

/// Sample data for walkthroughs when no exports are configured.
///
/// Sciences, engineering and commerce have experts. Physics and Management
/// Studies carry consolidated reviews; the Civil Engineering review is still
/// a draft. English and History tie on their automatic totals.
pub(crate) fn demo_dataset(
    academic_year: &AcademicYear,
) -> Result<PortalDataset, DatasetImportError> {
    let departments = DEMO_DEPARTMENTS
        .iter()
        .map(|(id, code, name, category, _)| Department {
            id: DepartmentId(*id),
            code: DepartmentCode((*code).to_string()),
            name: (*name).to_string(),
            category: *category,
        })
        .collect();
    let mut dataset = PortalDataset::new(departments)?;

    for (id, _, _, _, subtotals) in DEMO_DEPARTMENTS {
        for section in SectionKind::ordered() {
            dataset.add_section_row(
                DepartmentId(*id),
                academic_year.clone(),
                SectionRow {
                    section,
                    criterion: format!("self-assessment {}", section.numeral()),
                    points: subtotals[section.index()],
                },
            );
        }
    }

    for (expert, name, category) in [
        ("exp-sci", "Dr. Meera Rao", Category::Sciences),
        ("exp-eng", "Dr. Arjun Nair", Category::EngineeringAndTechnology),
        ("exp-com", "Dr. Farah Qureshi", Category::CommerceAndManagement),
    ] {
        dataset.assign_expert(ExpertAssignment {
            expert_id: ExpertId(expert.to_string()),
            name: name.to_string(),
            category,
        })?;
    }

    for (expert, department, total, remarks) in [
        ("exp-sci", 2, Some(612.0), "Research output verified on site"),
        ("exp-eng", 4, None, "Draft; lab audit pending"),
        ("exp-com", 11, Some(540.0), "Placement claims partly unsupported"),
    ] {
        dataset.record_review(ExpertReview {
            expert_id: ExpertId(expert.to_string()),
            department_id: DepartmentId(department),
            academic_year: academic_year.clone(),
            total_score: total,
            remarks: Some(remarks.to_string()),
        });
    }

    Ok(dataset)
}
