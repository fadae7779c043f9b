//! End-to-end ranking scenarios through the public service facade, using the
//! CSV dataset as the data source so the import, resolution and ranking
//! layers are exercised together.

mod common {
    use std::sync::Arc;

    use dept_review::dataset::PortalDataset;
    use dept_review::ranking::{AcademicYear, DepartmentRankingService, ScoringRubric};

    pub(super) const DEPARTMENTS: &str = "\
id,code,name,category
11,ZOO,Zoology,sciences
12,BOT,Botany,sciences
13,CHEM,Chemistry,sciences
21,ECO,Economics,social-sciences
22,SOC,Sociology,social-sciences
31,LAW,Law,professional
";

    pub(super) const SECTION_SCORES: &str = "\
department_id,academic_year,section,criterion,points
11,2024-25,I,syllabus revision,100
11,2024-25,II,journal papers,150
11,2024-25,III,faculty strength,150
11,2024-25,IV,placements,150
11,2024-25,V,outreach,50
12,2024-25,1,syllabus revision,100
12,2024-25,2,journal papers,150
12,2024-25,3,faculty strength,150
12,2024-25,4,placements,100
13,2024-25,I,syllabus revision,100
13,2024-25,II,journal papers,150
13,2024-25,III,faculty strength,150
13,2024-25,IV,placements,100
21,2024-25,I,syllabus revision,80
21,2024-25,II,journal papers,220
22,2024-25,I,syllabus revision,40
31,2024-25,V,legal aid clinics,300
12,2023-24,I,syllabus revision,10
";

    pub(super) const EXPERTS: &str = "\
expert_id,name,category
exp-sci,Dr. Rao,sciences
exp-soc,Dr. Iyer,social-sciences
";

    pub(super) const EXPERT_REVIEWS: &str = "\
expert_id,department,academic_year,total_score,remarks
exp-sci,CHEM,2024-25,680,Excellent instrumentation
exp-sci,11,2024-25,,Visit scheduled
exp-soc,SOC,2024-25,10,Incomplete records
";

    pub(super) fn year() -> AcademicYear {
        AcademicYear::parse("2024-25").expect("valid year")
    }

    pub(super) fn service() -> DepartmentRankingService<PortalDataset> {
        let dataset = PortalDataset::from_readers(
            DEPARTMENTS.as_bytes(),
            SECTION_SCORES.as_bytes(),
            EXPERTS.as_bytes(),
            EXPERT_REVIEWS.as_bytes(),
        )
        .expect("fixture dataset loads");
        DepartmentRankingService::new(Arc::new(dataset), ScoringRubric::default())
    }
}

use common::{service, year};
use dept_review::ranking::{
    AcademicYear, Category, DepartmentCode, DepartmentId, DepartmentKey, DepartmentScoreRecord,
};

fn codes(records: &[DepartmentScoreRecord]) -> Vec<&str> {
    records.iter().map(|r| r.department_code.0.as_str()).collect()
}

#[test]
fn sciences_ranking_follows_expert_partition_then_score() {
    let ranked = service().departments_with_scores(Category::Sciences, &year());

    // Chemistry (expert 680) leads; Zoology's review has no total yet.
    assert_eq!(codes(&ranked), vec!["CHEM", "ZOO", "BOT"]);
    assert_eq!(
        ranked.iter().map(|r| r.rank).collect::<Vec<_>>(),
        vec![Some(1), Some(2), Some(3)]
    );
    assert_eq!(ranked[0].auto_score, 500.0);
    assert_eq!(ranked[0].resolved_score, 680.0);
    assert!(!ranked[1].has_expert_score);
    assert_eq!(ranked[1].resolved_score, 600.0);
}

#[test]
fn equal_auto_scores_keep_name_order() {
    let dataset = dept_review::dataset::PortalDataset::from_readers(
        common::DEPARTMENTS.as_bytes(),
        common::SECTION_SCORES.as_bytes(),
        "expert_id,name,category\n".as_bytes(),
        "expert_id,department,academic_year,total_score,remarks\n".as_bytes(),
    )
    .expect("dataset without experts loads");
    let service = dept_review::ranking::DepartmentRankingService::new(
        std::sync::Arc::new(dataset),
        Default::default(),
    );

    let ranked = service.departments_with_scores(Category::Sciences, &year());

    // Botany and Chemistry both total 500; alphabetical listing decides.
    assert_eq!(codes(&ranked), vec!["ZOO", "BOT", "CHEM"]);
    assert_eq!(ranked[1].resolved_score, ranked[2].resolved_score);
    assert_eq!(ranked[1].rank, Some(2));
    assert_eq!(ranked[2].rank, Some(3));
}

#[test]
fn low_expert_score_outranks_high_auto_score() {
    let ranked = service().departments_with_scores(Category::SocialSciences, &year());

    assert_eq!(codes(&ranked), vec!["SOC", "ECO"]);
    assert_eq!(ranked[0].resolved_score, 10.0);
    assert_eq!(ranked[1].auto_score, 230.0, "section II capped at 150");
}

#[test]
fn overall_ranking_covers_every_department() {
    let ranked = service().overall_ranking(&year());

    assert_eq!(codes(&ranked), vec!["CHEM", "SOC", "ZOO", "BOT", "ECO", "LAW"]);
    let mut overall: Vec<u32> = ranked.iter().filter_map(|r| r.overall_rank).collect();
    overall.sort_unstable();
    assert_eq!(overall, (1..=6).collect::<Vec<_>>());
    assert!(ranked.iter().all(|r| r.rank.is_none()));
}

#[test]
fn category_without_expert_uses_auto_scores() {
    let ranked = service().departments_with_scores(Category::ProfessionalStudies, &year());

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].auto_score, 175.0);
    assert!(!ranked[0].has_expert_score);
}

#[test]
fn department_page_matches_list_views() {
    let service = service();
    let standing = service
        .department_standing(&DepartmentKey::Code(DepartmentCode("bot".to_string())), &year())
        .expect("botany exists");

    let category = service.departments_with_scores(Category::Sciences, &year());
    let overall = service.overall_ranking(&year());
    let in_category = category
        .iter()
        .find(|r| r.department_id == DepartmentId(12))
        .expect("botany listed");
    let in_overall = overall
        .iter()
        .find(|r| r.department_id == DepartmentId(12))
        .expect("botany listed");

    assert_eq!(standing.record.rank, in_category.rank);
    assert_eq!(standing.record.overall_rank, in_overall.overall_rank);
    assert_eq!(standing.record.resolved_score, in_category.resolved_score);
    assert_eq!(standing.category_size, 3);
    assert_eq!(standing.overall_size, 6);
}

#[test]
fn unknown_department_has_no_page() {
    assert!(service()
        .department_standing(&DepartmentKey::Id(DepartmentId(999)), &year())
        .is_none());
}

#[test]
fn earlier_year_only_sees_its_own_rows() {
    let earlier = AcademicYear::parse("2023-24").expect("valid");
    let ranked = service().departments_with_scores(Category::Sciences, &earlier);

    assert_eq!(codes(&ranked), vec!["BOT", "CHEM", "ZOO"]);
    assert_eq!(ranked[0].auto_score, 10.0);
    assert!(ranked.iter().all(|r| !r.has_expert_score));
}

#[test]
fn repeated_rankings_are_identical() {
    let service = service();
    assert_eq!(service.overall_ranking(&year()), service.overall_ranking(&year()));
}
