use bcn_core::costs::{construction_cost, user_cost};
use bcn_core::{Arc, Breakpoint, CostAttribute, Model, ModelFile, Node, OdPair};
use bcn_io::mathprog::{parse_mathprog, write_model};

fn line_model() -> Model {
    Model::from_file(ModelFile {
        nodes: vec![Node::new("1"), Node::new("2"), Node::new("3")],
        arcs: vec![Arc::new("1", "2", 10.0, 4.0), Arc::new("2", "3", 10.0, 6.0)],
        odpairs: vec![OdPair::new("1", "3", 30.0)],
        breakpoints: vec![Breakpoint::new(0.0, 1.0), Breakpoint::new(0.5, 0.8)],
        budget: 100.0,
        infrastructure_count: 2,
        user_cost_weight: CostAttribute::UserCost,
    })
    .unwrap()
}

fn written(model: &Model) -> String {
    let mut buf = Vec::new();
    write_model(model, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn sets_survive_roundtrip() {
    let model = line_model();
    let text = written(&model);
    assert!(text.starts_with("data;"));
    assert!(text.trim_end().ends_with("end;"));

    let data = parse_mathprog(&text).unwrap();
    assert_eq!(data.set("N").unwrap(), &["1", "2", "3"]);
    assert_eq!(data.set("A").unwrap(), &["arc_1_2", "arc_2_3"]);
    assert_eq!(data.set("A_OUT[1]").unwrap(), &["arc_1_2"]);
    assert!(data.set("A_IN[1]").unwrap().is_empty());
    assert!(data.set("A_OUT[3]").unwrap().is_empty());
    assert_eq!(data.set("A_IN[3]").unwrap(), &["arc_2_3"]);
    assert_eq!(data.set("I").unwrap(), &["0", "1"]);
    assert_eq!(data.set("OD").unwrap(), &["od_0"]);
    assert_eq!(data.set("J").unwrap(), &["0", "1"]);
    assert_eq!(data.value("ORIGIN", &["od_0"]), Some("1"));
    assert_eq!(data.value("DESTINATION", &["od_0"]), Some("3"));
}

#[test]
fn matrices_survive_roundtrip() {
    let model = line_model();
    let data = parse_mathprog(&written(&model)).unwrap();

    for arc in model.network().arcs() {
        for level in 0..2 {
            let l = level.to_string();
            assert_eq!(
                data.number("C", &[arc.key.as_str(), &l]),
                Some(user_cost(arc, level))
            );
            assert_eq!(
                data.number("M", &[arc.key.as_str(), &l]),
                Some(construction_cost(arc, level))
            );
        }
    }

    assert_eq!(data.number("P", &["od_0", "0"]), Some(0.0));
    assert_eq!(data.number("P", &["od_0", "1"]), Some(15.0));
    assert_eq!(data.number("Q", &["od_0", "0"]), Some(10.0));
    assert_eq!(data.number("Q", &["od_0", "1"]), Some(8.0));
    assert_eq!(data.scalar("B"), Some(100.0));
    assert_eq!(data.scalar("inf"), Some(1.0));
}

#[test]
fn overrides_reach_the_cost_matrices() {
    let mut file = line_model().to_file();
    file.arcs[0] = Arc::new("1", "2", 10.0, 4.0)
        .with_construction_cost_override(1, 7.5)
        .with_user_cost_override(1, 1.25);
    let model = Model::from_file(file).unwrap();
    let data = parse_mathprog(&written(&model)).unwrap();
    assert_eq!(data.number("M", &["arc_1_2", "1"]), Some(7.5));
    assert_eq!(data.number("C", &["arc_1_2", "1"]), Some(1.25));
}
