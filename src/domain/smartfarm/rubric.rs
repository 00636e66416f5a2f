//! The fixed SmartFarm scoring rubric.

use strum::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RubricItem {
    pub name: &'static str,
    pub max_score: u32,
    pub criteria: &'static str,
}

const fn item(name: &'static str, max_score: u32, criteria: &'static str) -> RubricItem {
    RubricItem {
        name,
        max_score,
        criteria,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum EvaluationCategory {
    #[strum(to_string = "Granos", serialize = "grains")]
    Grains,
    #[strum(to_string = "Ganadería", serialize = "ganaderia", serialize = "livestock")]
    Livestock,
    #[strum(
        to_string = "Cultivos de Alto Valor",
        serialize = "alto-valor",
        serialize = "high-value-crops"
    )]
    HighValueCrops,
}

impl EvaluationCategory {
    /// Worksheet holding the per-item scores of this category.
    pub fn worksheet(&self) -> &'static str {
        match self {
            EvaluationCategory::Grains => "Granos",
            EvaluationCategory::Livestock => "Ganadería",
            EvaluationCategory::HighValueCrops => "Cultivos de Alto Valor",
        }
    }

    pub fn items(&self) -> &'static [RubricItem] {
        match self {
            EvaluationCategory::Grains => GRAINS,
            EvaluationCategory::Livestock => LIVESTOCK,
            EvaluationCategory::HighValueCrops => HIGH_VALUE_CROPS,
        }
    }

    pub fn max_total(&self) -> u32 {
        self.items().iter().map(|i| i.max_score).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Branch {
    #[strum(to_string = "Córdoba", serialize = "cordoba")]
    Cordoba,
    #[strum(to_string = "Pilar")]
    Pilar,
    #[strum(to_string = "Sinsacate")]
    Sinsacate,
    #[strum(to_string = "Arroyito")]
    Arroyito,
    #[strum(to_string = "Santa Rosa", serialize = "santa-rosa")]
    SantaRosa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum ClientType {
    #[strum(to_string = "Tipo 1", serialize = "1")]
    Type1,
    #[strum(to_string = "Tipo 2", serialize = "2")]
    Type2,
    #[strum(to_string = "Tipo 3", serialize = "3")]
    Type3,
}

const GRAINS: &[RubricItem] = &[
    item("Item 1: Organización y estandarización de lotes.", 5, "Configuración/ Campos / Campos / Vista tabla..."),
    item("Item 2: Línea de guiado.", 5, "Configuración/ Campos/ Filtro campos sin guiado..."),
    item("Item 3: Organización altamente conectada.", 10, "Al menos un campo con tres tipos de labores cargadas."),
    item("Item 4: Uso de planificador de trabajo.", 15, "Planes de Trabajo enviados al equipo en los últimos 12 meses."),
    item("Item 5: Uso de Operations Center Mobile.", 10, "Navegación en la plataforma Móvil + Testimonio."),
    item("Item 6: JDLink.", 5, "Servicio de Conectividad JDLink activado."),
    item("Item 7: Envío remoto. Mezcla de tanque.", 10, "Mezcla de tanque generada o uso de SIA."),
    item("Item 8: % uso de autotrac en Tractor.", 10, "Promedio 40% de uso en tractores > 140 hp."),
    item("Item 9: % uso autotrac Cosecha.", 10, "Promedio 70% de uso en cosechadoras."),
    item("Item 10: % uso autotrac Pulverización.", 10, "Promedio 70% de uso en pulverizadoras."),
    item("Item 11: Uso de funcionalidades avanzadas.", 15, "Reporte + Video testimonio del cliente."),
    item("Item 12: Uso de tecnologías integradas.", 10, "Combine Advisor/ActiveYield/ExactApply/Sección."),
    item("Item 13: Señal de corrección StarFire.", 5, "Uso de señal SF2, SF3 o RTK."),
    item("Item 14: Paquete CSC.", 10, "Factura del paquete contratado."),
    item("Item 15: Vinculación de API.", 5, "Conexión activa mayor a 4 meses."),
    item("Item 16: JDLink en otra marca.", 15, "JDLink instalado en maquinaria de otra marca."),
];

const LIVESTOCK: &[RubricItem] = &[
    item("Item 1: Organización y estandarización de lotes.", 15, "Estandarización de lotes en OC."),
    item("Item 2: Digitalizar capa de siembra y mapa de picado.", 10, "Mapas de siembra y picado en el mismo lote."),
    item("Item 3: Uso de planificador de trabajo.", 20, "Uso en Siembra, Pulverización y Cosecha."),
    item("Item 4: Equipo registrados en el Centro de Operaciones.", 5, "Equipos e implementos de alimentación."),
    item("Item 5: Operadores registrados en el Centro de Operaciones.", 5, "Registro de empleados en la plataforma."),
    item("Item 6: Productos registrados en el Centro de Operaciones.", 5, "Químicos, variedades y fertilizantes."),
    item("Item 7: Uso de Operations Center Mobile.", 10, "Uso de App móvil + Testimonio."),
    item("Item 8: JDLink activado en máquinas John Deere.", 10, "Conectividad activa en flota JD."),
    item("Item 9: Planes de mantenimiento en tractores.", 10, "Seguimiento de mantenimiento en alimentación."),
    item("Item 10: Mapeo de constituyentes.", 20, "Uso de sensores de constituyentes (HarvestLab)."),
    item("Item 11: Conectividad alimentación.", 20, "Tractor de alimentación conectado."),
    item("Item 12: Generación de informes.", 10, "Informes de máquina generados."),
    item("Item 13: Paquete contratado con el concesionario (CSC).", 10, "Factura de servicios contratados."),
];

const HIGH_VALUE_CROPS: &[RubricItem] = &[
    item("Item 1: Organización y estandarización de lotes.", 15, "Configuración de campos."),
    item("Item 2: Lineas de guiado.", 5, "Lotes con líneas de guiado cargadas."),
    item("Item 3: Tener al menos una labor digitalizada.", 10, "Informe de cualquier labor digital."),
    item("Item 4: Uso de planificador de trabajo para alguna operación.", 15, "Planificación de tareas en OC."),
    item("Item 5: Uso del Operations Center Mobile.", 10, "App móvil y testimonio de valor."),
    item("Item 6: JDLink activado en máquinas John Deere.", 10, "Conectividad en equipos especializados."),
    item("Item 7: % uso de autotrac en Tractor.", 20, "Uso de guiado automático en tractores."),
    item("Item 8: Implement Guidance.", 20, "Uso de guiado de implementos."),
    item("Item 9: Señal de corrección StarFire.", 10, "Uso de señales de alta precisión."),
    item("Item 10: Paquete contratado con el concesionario (CSC).", 10, "Soporte especializado contratado."),
    item("Item 11: Equipos Registrados en Operations Center.", 5, "Inventario de equipos."),
    item("Item 12: Operadores registrados en Operations Center.", 5, "Staff cargado en plataforma."),
    item("Item 13: Productos registrados en el Operations Center.", 5, "Insumos y variedades."),
    item("Item 14: Configuración de Alertas Personalizables.", 10, "Alertas de mantenimiento o geocercas."),
];

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_max_totals() {
        assert_eq!(EvaluationCategory::Grains.max_total(), 150);
        assert_eq!(EvaluationCategory::Livestock.max_total(), 150);
        assert_eq!(EvaluationCategory::HighValueCrops.max_total(), 150);
    }

    #[test]
    fn test_item_counts() {
        assert_eq!(EvaluationCategory::Grains.items().len(), 16);
        assert_eq!(EvaluationCategory::Livestock.items().len(), 13);
        assert_eq!(EvaluationCategory::HighValueCrops.items().len(), 14);
    }

    #[test]
    fn test_category_display_and_parse() {
        assert_eq!(EvaluationCategory::Livestock.to_string(), "Ganadería");
        assert_eq!(
            "ganaderia".parse::<EvaluationCategory>().unwrap(),
            EvaluationCategory::Livestock
        );
        assert_eq!(
            "Cultivos de Alto Valor".parse::<EvaluationCategory>().unwrap(),
            EvaluationCategory::HighValueCrops
        );
        assert!("Soja".parse::<EvaluationCategory>().is_err());
    }

    #[test]
    fn test_worksheet_names_match_display() {
        for category in EvaluationCategory::iter() {
            assert_eq!(category.worksheet(), category.to_string());
        }
    }

    #[test]
    fn test_branch_and_client_type_parse() {
        assert_eq!("cordoba".parse::<Branch>().unwrap(), Branch::Cordoba);
        assert_eq!("Santa Rosa".parse::<Branch>().unwrap(), Branch::SantaRosa);
        assert_eq!("Tipo 2".parse::<ClientType>().unwrap(), ClientType::Type2);
        assert_eq!("3".parse::<ClientType>().unwrap(), ClientType::Type3);
        assert_eq!(Branch::iter().count(), 5);
    }

    #[test]
    fn test_item_names_are_unique_per_category() {
        for category in EvaluationCategory::iter() {
            let mut names = category.items().iter().map(|i| i.name).collect::<Vec<_>>();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), category.items().len());
        }
    }
}
