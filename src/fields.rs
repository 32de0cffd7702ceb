//! Form catalogue: the twelve inputs and the preset examples

/// One form input and its browser-side hints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec
{   pub name: &'static str
  , pub label: &'static str
  , pub unit: &'static str
  , pub description: &'static str
  , pub min: f64
  , pub max: f64
  , pub step: f64
}

pub static MEASUREMENTS: [FieldSpec; 11] = [
    FieldSpec
    {   name: "fixed_acidity"
      , label: "Fixed acidity"
      , unit: "g/L"
      , description: "Non-volatile acids that do not evaporate (tartaric acid)"
      , min: 3.0, max: 16.0, step: 0.1
    }
  , FieldSpec
    {   name: "volatile_acidity"
      , label: "Volatile acidity"
      , unit: "g/L"
      , description: "Volatile acids, mostly acetic acid"
      , min: 0.0, max: 2.0, step: 0.01
    }
  , FieldSpec
    {   name: "citric_acid"
      , label: "Citric acid"
      , unit: "g/L"
      , description: "Added for freshness and acidity"
      , min: 0.0, max: 2.0, step: 0.01
    }
  , FieldSpec
    {   name: "residual_sugar"
      , label: "Residual sugar"
      , unit: "g/L"
      , description: "Sugar left after fermentation"
      , min: 0.0, max: 70.0, step: 0.1
    }
  , FieldSpec
    {   name: "chlorides"
      , label: "Chlorides"
      , unit: "g/L"
      , description: "Salt content of the wine"
      , min: 0.0, max: 1.0, step: 0.001
    }
  , FieldSpec
    {   name: "free_sulfur_dioxide"
      , label: "Free sulfur dioxide"
      , unit: "mg/L"
      , description: "Prevents microbial growth and oxidation"
      , min: 0.0, max: 300.0, step: 1.0
    }
  , FieldSpec
    {   name: "total_sulfur_dioxide"
      , label: "Total sulfur dioxide"
      , unit: "mg/L"
      , description: "Total SO2, free and bound"
      , min: 0.0, max: 450.0, step: 1.0
    }
  , FieldSpec
    {   name: "density"
      , label: "Density"
      , unit: "g/mL"
      , description: "Depends on alcohol and sugar content"
      , min: 0.98, max: 1.04, step: 0.0001
    }
  , FieldSpec
    {   name: "pH"
      , label: "pH"
      , unit: ""
      , description: "Acidity of the wine, 3 to 4 for most wines"
      , min: 2.5, max: 4.5, step: 0.01
    }
  , FieldSpec
    {   name: "sulphates"
      , label: "Sulphates"
      , unit: "g/L"
      , description: "Preservative additive (potassium sulphate)"
      , min: 0.0, max: 2.5, step: 0.01
    }
  , FieldSpec
    {   name: "alcohol"
      , label: "Alcohol"
      , unit: "%"
      , description: "Alcohol content by volume"
      , min: 8.0, max: 15.0, step: 0.1
    }
];

pub const WINE_TYPE_FIELD: &str = "wine_type_red";

/// Named example sample used to prefill the form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset
{   pub key: &'static str
  , pub title: &'static str
  , pub wine_type_red: u8
  , /// Values in `MEASUREMENTS` order
    pub values: [f64; 11]
}

pub static PRESETS: [Preset; 2] = [
    Preset
    {   key: "good-red"
      , title: "Good red"
      , wine_type_red: 1
      , values: [8.5, 0.4, 0.3, 2.1, 0.08, 15.0, 45.0, 0.996, 3.3, 0.65, 11.5]
    }
  , Preset
    {   key: "average-white"
      , title: "Average white"
      , wine_type_red: 0
      , values: [6.8, 0.3, 0.25, 8.5, 0.045, 30.0, 120.0, 0.994, 3.2, 0.45, 10.5]
    }
];

impl Preset
{   /// Preset as form fields, ready to echo into the inputs
    pub fn to_form(&self) -> crate::request::FormFields
    {   let mut fields: crate::request::FormFields = MEASUREMENTS
          .iter()
          .zip(self.values.iter())
          .map(|(spec, value)| (spec.name.to_string(), value.to_string()))
          .collect();
        fields.insert(
          WINE_TYPE_FIELD.to_string(),
          self.wine_type_red.to_string()
        );
        fields
    }
}

pub fn find_preset(key: &str) -> Option<&'static Preset>
{   PRESETS.iter().find(|preset| preset.key == key)
}

/// Example request body shown on the API info page
pub fn example_payload() -> serde_json::Value
{   serde_json::json!({
      "fixed_acidity": 7.4,
      "volatile_acidity": 0.7,
      "citric_acid": 0.0,
      "residual_sugar": 1.9,
      "chlorides": 0.076,
      "free_sulfur_dioxide": 11.0,
      "total_sulfur_dioxide": 34.0,
      "density": 0.9978,
      "pH": 3.51,
      "sulphates": 0.56,
      "alcohol": 9.4,
      "wine_type_red": 1
    })
}
