use loginform::form::{FieldLens, FormModel};

#[derive(Clone, loginform::form::FormModel)]
struct DemoForm {
    email: String,
    display_name: String,
}

fn main() {
    let fields = DemoForm::fields();
    let lens = fields.display_name();
    let mut model = DemoForm {
        email: "a@mail.com".to_string(),
        display_name: "Ana".to_string(),
    };
    lens.set(&mut model, "Bea".to_string());
    assert_eq!(lens.key().as_str(), "display_name");
    assert_eq!(lens.get(&model), "Bea");
    assert_eq!(DemoForm::field_keys().len(), 2);

    let values = model.to_values();
    assert_eq!(values.get(fields.email().key()), "a@mail.com");
    let restored = DemoForm::from_values(&values.with(fields.email().key(), "b@mail.com"));
    assert_eq!(restored.email, "b@mail.com");
    assert_eq!(restored.display_name, "Bea");
}
