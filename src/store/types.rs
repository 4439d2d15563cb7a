use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// 存放图片的字段
pub const IMAGE_FIELD: &str = "image";
/// 图片标签字段
pub const TEXT_FIELD: &str = "text";
/// 图片向量化模块
pub const IMAGE_VECTORIZER: &str = "img2vec-neural";

/// 一条图片记录，图片以 base64 文本保存
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub image: String,
    pub text: String,
}

/// Weaviate 中 class 的定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSchema {
    pub class: String,
    #[serde(default)]
    pub vectorizer: String,
    #[serde(default)]
    pub vector_index_type: String,
    #[serde(default)]
    pub module_config: Map<String, Value>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    pub data_type: Vec<String>,
}

impl ClassSchema {
    /// 构建一个以图片字段为向量来源的 class
    ///
    /// # Arguments
    ///
    /// * `name` - class 名称
    /// * `vector_field` - 参与向量化的 blob 字段
    /// * `aux_fields` - 附加的字符串字段
    pub fn image_class(name: &str, vector_field: &str, aux_fields: &[&str]) -> Self {
        let mut module_config = Map::new();
        module_config.insert(IMAGE_VECTORIZER.to_string(), json!({ "imageFields": [vector_field] }));

        let mut properties = vec![Property::new(vector_field, "blob")];
        properties.extend(aux_fields.iter().map(|name| Property::new(name, "string")));

        Self {
            class: name.to_string(),
            vectorizer: IMAGE_VECTORIZER.to_string(),
            vector_index_type: "hnsw".to_string(),
            module_config,
            properties,
        }
    }

    /// 本服务使用的默认 class：`image` + `text`
    pub fn employee(name: &str) -> Self {
        Self::image_class(name, IMAGE_FIELD, &[TEXT_FIELD])
    }

    /// 参与向量化的图片字段
    pub fn image_fields(&self) -> Vec<&str> {
        self.module_config
            .get(&self.vectorizer)
            .and_then(|c| c.get("imageFields"))
            .and_then(Value::as_array)
            .map(|fields| fields.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// 判断已存在的 class 是否与 `wanted` 形状一致
    ///
    /// 数据库可能会补充额外的属性和配置，这里只要求 `wanted` 中的内容都存在。
    pub fn is_compatible_with(&self, wanted: &ClassSchema) -> bool {
        if self.class != wanted.class
            || self.vectorizer != wanted.vectorizer
            || !self.vector_index_type.eq_ignore_ascii_case(&wanted.vector_index_type)
            || self.image_fields() != wanted.image_fields()
        {
            return false;
        }
        wanted.properties.iter().all(|want| {
            self.properties
                .iter()
                .any(|have| have.name == want.name && have.same_type(want))
        })
    }
}

impl Property {
    pub fn new(name: &str, data_type: &str) -> Self {
        Self { name: name.to_string(), data_type: vec![data_type.to_string()] }
    }

    fn same_type(&self, other: &Property) -> bool {
        // 新版 Weaviate 会把 string 自动迁移为 text
        let normalize = |t: &String| if t == "string" { "text".to_string() } else { t.clone() };
        self.data_type.iter().map(normalize).eq(other.data_type.iter().map(normalize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_class_json() {
        let schema = ClassSchema::employee("Employee");
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            value,
            json!({
                "class": "Employee",
                "vectorizer": "img2vec-neural",
                "vectorIndexType": "hnsw",
                "moduleConfig": { "img2vec-neural": { "imageFields": ["image"] } },
                "properties": [
                    { "name": "image", "dataType": ["blob"] },
                    { "name": "text", "dataType": ["string"] },
                ],
            })
        );
    }

    #[test]
    fn compatible_with_server_extensions() {
        let wanted = ClassSchema::employee("Employee");
        let existing: ClassSchema = serde_json::from_value(json!({
            "class": "Employee",
            "vectorizer": "img2vec-neural",
            "vectorIndexType": "hnsw",
            "vectorIndexConfig": { "ef": -1 },
            "moduleConfig": { "img2vec-neural": { "imageFields": ["image"] } },
            "properties": [
                { "name": "image", "dataType": ["blob"] },
                { "name": "text", "dataType": ["text"], "tokenization": "word" },
                { "name": "extra", "dataType": ["int"] },
            ],
        }))
        .unwrap();
        assert!(existing.is_compatible_with(&wanted));
    }

    #[test]
    fn incompatible_shapes() {
        let wanted = ClassSchema::employee("Employee");

        let mut other = wanted.clone();
        other.vectorizer = "text2vec-openai".to_string();
        assert!(!other.is_compatible_with(&wanted));

        let other = ClassSchema::image_class("Employee", "photo", &["text"]);
        assert!(!other.is_compatible_with(&wanted));

        let other = ClassSchema::image_class("Employee", "image", &[]);
        assert!(!other.is_compatible_with(&wanted));
    }
}
